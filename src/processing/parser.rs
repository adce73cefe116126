use crate::error::PipelineError;

/// One parsed sensor record: ordered field labels and their raw value
/// tokens.
///
/// Wire format is `label1, label2, ... : value1, value2, ...` with the
/// record split on the first `:`. Label and value counts are reconciled
/// at parse time so `labels().len() == values().len()` always holds:
/// surplus labels are truncated, missing labels are right-padded with
/// empty strings. Values are never adjusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    labels: Vec<String>,
    values: Vec<String>,
}

impl Sample {
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let (labels_part, values_part) = raw
            .split_once(':')
            .ok_or_else(|| PipelineError::MalformedRecord(raw.trim().to_string()))?;

        let mut labels: Vec<String> = labels_part
            .split(',')
            .map(|token| token.trim().to_string())
            .collect();
        let values: Vec<String> = values_part
            .split(',')
            .map(|token| token.trim().to_string())
            .collect();

        if labels.len() > values.len() {
            labels.truncate(values.len());
        } else {
            labels.resize(values.len(), String::new());
        }

        Ok(Self { labels, values })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw token for a labeled field.
    pub fn value(&self, label: &str) -> Result<&str, PipelineError> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| self.values[idx].as_str())
            .ok_or_else(|| PipelineError::UnknownField(label.to_string()))
    }

    /// Raw token by position.
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Raw tokens for a sequence of labels, in the requested order.
    pub fn values_for(&self, labels: &[&str]) -> Result<Vec<&str>, PipelineError> {
        labels.iter().map(|label| self.value(label)).collect()
    }

    /// Numeric value for a labeled field.
    pub fn float(&self, label: &str) -> Result<f64, PipelineError> {
        let token = self.value(label)?;
        parse_float(label, token)
    }

    /// All values converted to floats, all-or-nothing.
    pub fn to_floats(&self) -> Result<Vec<f64>, PipelineError> {
        self.labels
            .iter()
            .zip(self.values.iter())
            .map(|(label, token)| parse_float(label, token))
            .collect()
    }
}

fn parse_float(label: &str, token: &str) -> Result<f64, PipelineError> {
    token.parse::<f64>().map_err(|_| PipelineError::InvalidNumber {
        label: label.to_string(),
        token: token.to_string(),
    })
}
