use log::error;
use serde::Serialize;

pub(crate) const FAILURE_NOTICE: &str = "Operation failed. Please try again.";

pub(crate) fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => error!("Failed to render output: {}", err),
    }
}

pub(crate) fn print_failure(notice: &str) {
    eprintln!("{}", notice);
}
