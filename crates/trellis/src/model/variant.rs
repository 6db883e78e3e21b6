//! Data roles and the `Variant` data container.
//!
//! Roles define what kind of data is being requested from a model item.
//! Each item can expose several pieces of data, distinguished by role.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Standard roles for accessing different aspects of item data.
///
/// When querying data from a model via `ItemModel::data()`, the role specifies
/// what information is being requested.
///
/// - **Display**: The primary text to show (e.g., item label)
/// - **Icon**: Icon name or handle to display alongside text
/// - **Sort**: Key used when sorting by this column
/// - **Edit**: Value for editing (may differ from display text)
/// - **ToolTip**: Text shown when hovering over the item
/// - **Class**: Style class applied by views
/// - **Custom**: Data-source specific payload
/// - **User**: First role available for application data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelRole {
    /// Primary text to display.
    #[default]
    Display,
    /// Icon to show next to the text.
    Icon,
    /// Sort key for the item.
    Sort,
    /// Value for editing.
    Edit,
    /// Tooltip text shown on hover.
    ToolTip,
    /// Style class name.
    Class,
    /// Data-source specific payload.
    Custom,
    /// Application-defined role. Use `ModelRole::User(n)` where n >= 0.
    User(u32),
}

impl ModelRole {
    /// Returns `true` if this is a user-defined role.
    #[inline]
    pub fn is_user_role(&self) -> bool {
        matches!(self, ModelRole::User(_))
    }

    /// Returns the numeric value of this role.
    ///
    /// Standard roles have fixed values 0-255.
    /// User roles have values >= 256.
    pub fn value(&self) -> u32 {
        match self {
            ModelRole::Display => 0,
            ModelRole::Icon => 1,
            ModelRole::Sort => 2,
            ModelRole::Edit => 3,
            ModelRole::ToolTip => 4,
            ModelRole::Class => 5,
            ModelRole::Custom => 6,
            ModelRole::User(n) => 256 + n,
        }
    }

    /// Creates a role from a numeric value.
    ///
    /// Returns `None` for reserved but undefined role values (7-255).
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ModelRole::Display),
            1 => Some(ModelRole::Icon),
            2 => Some(ModelRole::Sort),
            3 => Some(ModelRole::Edit),
            4 => Some(ModelRole::ToolTip),
            5 => Some(ModelRole::Class),
            6 => Some(ModelRole::Custom),
            7..=255 => None,
            n => Some(ModelRole::User(n - 256)),
        }
    }
}

/// Type-erased container for item data.
///
/// `Variant` is what `ItemModel::data()` and model stylers return. It is
/// cheap to clone; custom payloads are shared through an `Arc`.
///
/// # Example
///
/// ```
/// use trellis::model::Variant;
///
/// let data = Variant::from("Hello");
/// assert_eq!(data.as_str(), Some("Hello"));
///
/// let data = Variant::new(42u32);
/// assert_eq!(data.downcast::<u32>(), Some(&42));
/// ```
#[derive(Clone, Default)]
pub enum Variant {
    /// No data.
    #[default]
    Invalid,
    /// String data.
    String(String),
    /// Signed integer data.
    Int(i64),
    /// Unsigned integer data.
    UInt(u64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Custom data (type-erased, shared).
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Variant {
    /// Creates new custom data from any type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Variant::Custom(Arc::new(value))
    }

    /// Returns `true` if this holds data.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Variant::Invalid)
    }

    /// Returns `true` if this holds string data.
    pub fn is_string(&self) -> bool {
        matches!(self, Variant::String(_))
    }

    /// Attempts to get the data as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as a signed integer.
    ///
    /// Unsigned values that fit are converted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Int(n) => Some(*n),
            Variant::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Attempts to get the data as an unsigned integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Variant::UInt(n) => Some(*n),
            Variant::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Variant::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            Variant::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Renders the value as text, as a view would display it.
    ///
    /// Custom payloads and invalid variants render as an empty string.
    pub fn to_display_string(&self) -> String {
        match self {
            Variant::Invalid | Variant::Custom(_) => String::new(),
            Variant::String(s) => s.clone(),
            Variant::Int(n) => n.to_string(),
            Variant::UInt(n) => n.to_string(),
            Variant::Float(n) => n.to_string(),
            Variant::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Invalid => write!(f, "Invalid"),
            Variant::String(s) => f.debug_tuple("String").field(s).finish(),
            Variant::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Variant::UInt(n) => f.debug_tuple("UInt").field(n).finish(),
            Variant::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Variant::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Variant::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Invalid, Variant::Invalid) => true,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Int(a), Variant::Int(b)) => a == b,
            (Variant::UInt(a), Variant::UInt(b)) => a == b,
            (Variant::Float(a), Variant::Float(b)) => a == b,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            // Custom payloads compare by identity
            (Variant::Custom(a), Variant::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::String(s)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::String(s.to_string())
    }
}

impl From<&String> for Variant {
    fn from(s: &String) -> Self {
        Variant::String(s.clone())
    }
}

impl From<i64> for Variant {
    fn from(n: i64) -> Self {
        Variant::Int(n)
    }
}

impl From<i32> for Variant {
    fn from(n: i32) -> Self {
        Variant::Int(n as i64)
    }
}

impl From<u64> for Variant {
    fn from(n: u64) -> Self {
        Variant::UInt(n)
    }
}

impl From<u32> for Variant {
    fn from(n: u32) -> Self {
        Variant::UInt(n as u64)
    }
}

impl From<usize> for Variant {
    fn from(n: usize) -> Self {
        Variant::UInt(n as u64)
    }
}

impl From<f64> for Variant {
    fn from(n: f64) -> Self {
        Variant::Float(n)
    }
}

impl From<f32> for Variant {
    fn from(n: f32) -> Self {
        Variant::Float(n as f64)
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Variant::Bool(b)
    }
}

impl<T: Into<Variant>> From<Option<T>> for Variant {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Variant::Invalid, Into::into)
    }
}
