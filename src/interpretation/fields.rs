use crate::error::FieldError;

/// A "LABEL: value" or "LABEL value" line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

impl Field<'_> {
    /// Case-insensitive substring test on the label.
    pub fn label_contains(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Splits on the first colon when there is one, otherwise on the first run of whitespace.
pub fn split_field(line: &str) -> Result<Field<'_>, FieldError> {
    if let Some((label, value)) = line.split_once(':') {
        return Ok(Field {
            label: label.trim(),
            value: value.trim(),
        });
    }

    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((label, value)) => Ok(Field {
            label,
            value: value.trim(),
        }),
        None => Err(FieldError::Unlabelled(line.to_string())),
    }
}
