use crate::{
    embedded::EmbeddedSpec,
    form::{ErrorContext, ModelFormClass},
    model::{FieldKind, FieldModel, ModelDef},
    traits::{Entity, Record},
    value::Value,
};
use std::fmt;

fn text(field: &str, value: Value) -> Result<String, String> {
    match value {
        Value::None => Ok(String::new()),
        Value::Text(text) => Ok(text),
        other => Err(format!("{field}: expected text, got {other:?}")),
    }
}

///
/// Phone
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Phone {
    pub(crate) label: String,
    pub(crate) number: String,
}

static PHONE_FIELDS: [FieldModel; 2] = [
    FieldModel::new("label", FieldKind::Choice(&["home", "work", "mobile"])),
    FieldModel::new("number", FieldKind::Text { max_len: Some(20) }),
];

static PHONE_MODEL: ModelDef = ModelDef {
    name: "Phone",
    verbose_name: "phone number",
    primary_key: None,
    fields: &PHONE_FIELDS,
};

impl Record for Phone {
    const MODEL: &'static ModelDef = &PHONE_MODEL;

    fn value(&self, field: &str) -> Value {
        match field {
            "label" => Value::from(self.label.as_str()),
            "number" => Value::from(self.number.as_str()),
            _ => Value::None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), String> {
        match field {
            "label" => self.label = text(field, value)?,
            "number" => self.number = text(field, value)?,
            _ => return Err(format!("unknown field '{field}'")),
        }

        Ok(())
    }

    fn validate_custom(&self, ctx: &mut dyn ErrorContext) {
        if !self.number.chars().any(|c| c.is_ascii_digit()) {
            ctx.issue_at("number", "Enter a valid phone number.");
        }
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

pub(crate) fn phone(label: &str, number: &str) -> Phone {
    Phone {
        label: label.to_string(),
        number: number.to_string(),
    }
}

///
/// Address
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Address {
    pub(crate) street: String,
    pub(crate) city: String,
    pub(crate) zip: String,
}

static ADDRESS_FIELDS: [FieldModel; 3] = [
    FieldModel::new("street", FieldKind::TEXT).optional(),
    FieldModel::new("city", FieldKind::TEXT),
    FieldModel::new("zip", FieldKind::Text { max_len: Some(10) }).optional(),
];

static ADDRESS_MODEL: ModelDef = ModelDef {
    name: "Address",
    verbose_name: "address",
    primary_key: None,
    fields: &ADDRESS_FIELDS,
};

impl Record for Address {
    const MODEL: &'static ModelDef = &ADDRESS_MODEL;

    fn value(&self, field: &str) -> Value {
        match field {
            "street" => Value::from(self.street.as_str()),
            "city" => Value::from(self.city.as_str()),
            "zip" => Value::from(self.zip.as_str()),
            _ => Value::None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), String> {
        match field {
            "street" => self.street = text(field, value)?,
            "city" => self.city = text(field, value)?,
            "zip" => self.zip = text(field, value)?,
            _ => return Err(format!("unknown field '{field}'")),
        }

        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.city)
    }
}

pub(crate) fn address(city: &str) -> Address {
    Address {
        city: city.to_string(),
        ..Address::default()
    }
}

///
/// Contact
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Contact {
    pub(crate) id: Option<u64>,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) tags: Vec<String>,
    pub(crate) phones: Vec<Phone>,
    pub(crate) addresses: Vec<Address>,
}

static CONTACT_FIELDS: [FieldModel; 3] = [
    FieldModel::new("name", FieldKind::Text { max_len: Some(100) }),
    FieldModel::new("email", FieldKind::TEXT).optional(),
    FieldModel::new("tags", FieldKind::ManyToMany).optional(),
];

static CONTACT_MODEL: ModelDef = ModelDef {
    name: "Contact",
    verbose_name: "contact",
    primary_key: Some("id"),
    fields: &CONTACT_FIELDS,
};

impl Contact {
    pub(crate) fn phones_spec() -> EmbeddedSpec<Self, ModelFormClass<Phone>> {
        EmbeddedSpec::new("phones", Self::phones, Self::set_phones)
    }

    pub(crate) fn addresses_spec() -> EmbeddedSpec<Self, ModelFormClass<Address>> {
        EmbeddedSpec::new("addresses", Self::addresses, Self::set_addresses)
    }

    fn phones(&self) -> &[Phone] {
        &self.phones
    }

    fn set_phones(&mut self, phones: Vec<Phone>) {
        self.phones = phones;
    }

    fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    fn set_addresses(&mut self, addresses: Vec<Address>) {
        self.addresses = addresses;
    }
}

impl Record for Contact {
    const MODEL: &'static ModelDef = &CONTACT_MODEL;

    fn value(&self, field: &str) -> Value {
        match field {
            "name" => Value::from(self.name.as_str()),
            "email" => Value::from(self.email.as_str()),
            "tags" => Value::List(self.tags.clone()),
            _ => Value::None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), String> {
        match field {
            "name" => self.name = text(field, value)?,
            "email" => self.email = text(field, value)?,
            _ => return Err(format!("unknown field '{field}'")),
        }

        Ok(())
    }
}

impl Entity for Contact {
    type Key = u64;

    fn key(&self) -> Option<u64> {
        self.id
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub(crate) fn contact(name: &str, phones: Vec<Phone>) -> Contact {
    Contact {
        name: name.to_string(),
        phones,
        ..Contact::default()
    }
}
