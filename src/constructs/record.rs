use crate::FormatDescriptor;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i32),
    UInt(u32),
    Timestamp(u64),
    Float(f32),
    Text(String),
    Counts(Vec<u32>),
}

/// One decoded record: values in descriptor field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    desc: &'static FormatDescriptor,
    values: Vec<Value>,
}
impl Record {
    pub(crate) fn new(desc: &'static FormatDescriptor, values: Vec<Value>) -> Self {
        debug_assert_eq!(desc.fields.len(), values.len());
        Self { desc, values }
    }

    pub fn descriptor(&self) -> &'static FormatDescriptor {
        self.desc
    }

    /// Looks a value up by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.desc
            .fields
            .iter()
            .position(|f| f.name == name)
            .map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
