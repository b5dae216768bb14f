//! # Roles
//!
//! A role names the kind of caller a controller/service pair is written for.
//! Roles are zero-sized markers: they only exist to pair a controller with an
//! entity at compile time and to check a [`Principal`](crate::Principal) at runtime.
//!
//! Applications add their own roles by implementing [`Role`] on any type,
//! including entity types that double as role records.

/// The kind of caller a controller or service serves.
pub trait Role: Send + Sync + 'static {
    /// Name stored in a principal's role set.
    const NAME: &'static str;
}

/// Any caller, authenticated or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anonymous;

/// A caller that presented valid credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Authenticated;

/// A caller with administrative rights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Administrator;

impl Role for Anonymous {
    const NAME: &'static str = "Anonymous";
}

impl Role for Authenticated {
    const NAME: &'static str = "Authenticated";
}

impl Role for Administrator {
    const NAME: &'static str = "Administrator";
}
