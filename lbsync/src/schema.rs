//! Field schema of the load balancer resource.

use crate::data::ResourceData;
use crate::error::{Error, Result};

pub const COMPARTMENT_ID: &str = "compartment_id";
pub const SHAPE: &str = "shape";
pub const SUBNET_IDS: &str = "subnet_ids";
pub const DISPLAY_NAME: &str = "display_name";
pub const ID: &str = "id";
pub const IP_ADDRESSES: &str = "ip_addresses";
pub const STATE: &str = "state";
pub const TIME_CREATED: &str = "time_created";

/// Shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    List,
}

/// Definition of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Supplied by the user and must be present on create.
    pub required: bool,
    /// Changing it requires replacing the resource.
    pub force_new: bool,
    /// Derived from the remote resource, never user-supplied.
    pub computed: bool,
}

const fn input(name: &'static str, kind: FieldKind, force_new: bool) -> Field {
    Field {
        name,
        kind,
        required: true,
        force_new,
        computed: false,
    }
}

const fn computed(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: false,
        force_new: false,
        computed: true,
    }
}

/// Every field of the load balancer resource.
pub static LOAD_BALANCER: [Field; 8] = [
    input(COMPARTMENT_ID, FieldKind::String, true),
    input(SHAPE, FieldKind::String, true),
    input(SUBNET_IDS, FieldKind::List, true),
    input(DISPLAY_NAME, FieldKind::String, false),
    computed(ID, FieldKind::String),
    computed(IP_ADDRESSES, FieldKind::List),
    computed(STATE, FieldKind::String),
    computed(TIME_CREATED, FieldKind::String),
];

/// Fields an update may change in place.
pub fn mutable_fields() -> impl Iterator<Item = &'static Field> {
    LOAD_BALANCER
        .iter()
        .filter(|f| !f.computed && !f.force_new)
}

/// Check that every required field is set and non-empty.
pub fn validate_required(data: &ResourceData) -> Result<()> {
    for field in LOAD_BALANCER.iter().filter(|f| f.required) {
        let present = match field.kind {
            FieldKind::String => data.get_str(field.name).is_some_and(|s| !s.is_empty()),
            FieldKind::List => data.get_list(field.name).is_some_and(|l| !l.is_empty()),
        };
        if !present {
            return Err(Error::MissingField(field.name));
        }
    }
    Ok(())
}
