use serde::{Deserialize, Serialize};

use crate::fields;

/// An ID in the record store.
pub type Id = i64;

/// A single teacher record as held in the store. Business fields use the
/// store's suffixed naming convention on the wire.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Teacher {
    /// The ID of the record.
    #[serde(rename = "Id")]
    pub id: Id,

    /// The teacher's full display name.
    #[serde(
        rename = "name_c",
        default,
        deserialize_with = "fields::string_or_null"
    )]
    pub name: String,

    /// The teacher's contact address.
    #[serde(
        rename = "email_c",
        default,
        deserialize_with = "fields::string_or_null"
    )]
    pub email: String,

    /// The department the teacher belongs to. Constrained to a fixed set
    /// by the form, not by the store.
    #[serde(
        rename = "department_c",
        default,
        deserialize_with = "fields::string_or_null"
    )]
    pub department: String,

    /// The hire date in ISO form. Blank when not recorded.
    #[serde(
        rename = "hire_date_c",
        default,
        deserialize_with = "fields::string_or_null"
    )]
    pub hire_date: String,

    /// The metadata assigned by the store.
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl Teacher {
    /// The hire date formatted for display, or "Not specified" when blank.
    pub fn hire_date_display(&self) -> String {
        fields::display_date(&self.hire_date)
    }
}

/// Fields assigned by the store. They are passed through on reads and
/// never written.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Tags", default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    #[serde(rename = "CreatedOn", default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,

    #[serde(rename = "ModifiedOn", default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
}

/// The four writable fields of a teacher record. Each defaults to the
/// empty string when absent from input.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TeacherFields {
    #[serde(rename = "name_c", default)]
    pub name: String,

    #[serde(rename = "email_c", default)]
    pub email: String,

    #[serde(rename = "department_c", default)]
    pub department: String,

    #[serde(rename = "hire_date_c", default)]
    pub hire_date: String,
}

impl TeacherFields {
    /// Copies the writable fields out of an existing record, for editing.
    pub fn from_record(teacher: &Teacher) -> Self {
        TeacherFields {
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            department: teacher.department.clone(),
            hire_date: teacher.hire_date.clone(),
        }
    }
}
