//! Address list and edit commands

use super::shell::Session;
use crate::output;
use addrbook_client::api::{Address, AddressCreateRequest, AddressUpdate};
use anyhow::Result;
use dialoguer::{Confirm, Input};

/// Values collected from the address form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub addr_1: String,
    pub addr_2: String,
    pub zip: String,
    pub city: String,
    pub country: String,
    pub isdefault: bool,
}

impl AddressForm {
    fn from_address(address: &Address) -> Self {
        Self {
            addr_1: address.addr_1.clone(),
            addr_2: address.addr_2.clone().unwrap_or_default(),
            zip: address.zip.clone(),
            city: address.city.clone(),
            country: address.country.clone(),
            isdefault: address.is_default,
        }
    }

    /// Payload for a new address. An empty second line is left out.
    pub fn into_create(self) -> AddressCreateRequest {
        AddressCreateRequest {
            addr_1: self.addr_1,
            addr_2: Some(self.addr_2).filter(|s| !s.trim().is_empty()),
            zip: self.zip,
            city: self.city,
            country: self.country,
            isdefault: Some(self.isdefault),
        }
    }

    /// Only the fields that differ from `current`.
    pub fn changes_from(self, current: &Address) -> AddressUpdate {
        fn changed(new: String, old: &str) -> Option<String> {
            (new != old).then_some(new)
        }
        AddressUpdate {
            addr_1: changed(self.addr_1, &current.addr_1),
            addr_2: changed(self.addr_2, current.addr_2.as_deref().unwrap_or("")),
            zip: changed(self.zip, &current.zip),
            city: changed(self.city, &current.city),
            country: changed(self.country, &current.country),
            isdefault: (self.isdefault != current.is_default).then_some(self.isdefault),
        }
    }
}

fn prompt_form(session: &Session, initial: &AddressForm) -> Result<AddressForm> {
    let field = |label: &str, value: &str, required: bool| -> Result<String> {
        let mut input = Input::<String>::with_theme(&session.theme)
            .with_prompt(label)
            .with_initial_text(value)
            .allow_empty(!required);
        if required {
            input = input.validate_with(|s: &String| -> std::result::Result<(), &'static str> {
                if s.trim().is_empty() {
                    Err("this field is required")
                } else {
                    Ok(())
                }
            });
        }
        Ok(input.interact_text()?)
    };

    Ok(AddressForm {
        addr_1: field("Address line 1", &initial.addr_1, true)?,
        addr_2: field("Address line 2 (optional)", &initial.addr_2, false)?,
        zip: field("ZIP", &initial.zip, true)?,
        city: field("City", &initial.city, true)?,
        country: field("Country", &initial.country, true)?,
        isdefault: Confirm::with_theme(&session.theme)
            .with_prompt("Set as default address?")
            .default(initial.isdefault)
            .interact()?,
    })
}

/// Show the address list, or the load error.
pub async fn list(session: &Session) {
    match session.client.addresses().list().await {
        Ok(addresses) => output::addresses(&addresses),
        Err(e) => output::error(&e.message_or("Failed to load addresses")),
    }
}

pub async fn add(session: &Session) -> Result<()> {
    let form = prompt_form(session, &AddressForm::default())?;

    match session.client.addresses().create(&form.into_create()).await {
        Ok(address) => {
            output::success(&format!("Added address #{}.", address.id));
            list(session).await;
        }
        Err(e) => output::error(&e.message_or("Failed to add address")),
    }
    Ok(())
}

pub async fn update(session: &Session, id: i64) -> Result<()> {
    let current = match session.client.addresses().list().await {
        Ok(addresses) => addresses.into_iter().find(|a| a.id == id),
        Err(e) => {
            output::error(&e.message_or("Failed to load addresses"));
            return Ok(());
        }
    };
    let Some(current) = current else {
        output::error(&format!("No address #{}.", id));
        return Ok(());
    };

    let form = prompt_form(session, &AddressForm::from_address(&current))?;
    let patch = form.changes_from(&current);
    if patch.is_empty() {
        output::hint("Nothing changed.");
        return Ok(());
    }

    match session.client.addresses().update(id, &patch).await {
        Ok(_) => {
            output::success(&format!("Updated address #{}.", id));
            list(session).await;
        }
        Err(e) => output::error(&e.message_or("Failed to update address")),
    }
    Ok(())
}

pub async fn delete(session: &Session, id: i64) -> Result<()> {
    let confirmed = Confirm::with_theme(&session.theme)
        .with_prompt("Delete this address?")
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }

    match session.client.addresses().delete(id).await {
        Ok(()) => {
            output::success(&format!("Deleted address #{}.", id));
            list(session).await;
        }
        Err(e) => output::error(&e.message_or("Failed to delete address")),
    }
    Ok(())
}
