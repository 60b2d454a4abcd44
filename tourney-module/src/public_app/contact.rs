use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use tourney_common::{
    data::{ContactQuery, NewContactQuery, QueryStatus},
    store::{DataStore, RecordStore},
};

use super::error::PublicError;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Email pattern is valid");
}

#[derive(Clone, Debug)]
pub(crate) struct ContactForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) message: String,
}

impl ContactForm {
    fn into_new_query(self) -> Result<NewContactQuery, PublicError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() {
            return Err(PublicError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(PublicError::MissingField("email"));
        }
        if message.is_empty() {
            return Err(PublicError::MissingField("message"));
        }
        if !EMAIL.is_match(email) {
            return Err(PublicError::InvalidEmail(email.to_owned()));
        }
        let phone = self.phone.map(|phone| phone.trim().to_owned()).filter(|phone| !phone.is_empty());
        Ok(NewContactQuery {
            name: name.to_owned(),
            email: email.to_owned(),
            phone,
            message: message.to_owned(),
            status: QueryStatus::Unread,
            admin_notes: None,
        })
    }
}

pub(crate) async fn submit_contact_query(
    store: &dyn DataStore,
    form: ContactForm,
) -> Result<ContactQuery, PublicError> {
    let new_query = form.into_new_query()?;
    let query: ContactQuery = store.create(&new_query).await?;
    info!("Contact query received, id: {}", query.id);
    Ok(query)
}
