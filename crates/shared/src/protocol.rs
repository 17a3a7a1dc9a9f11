use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /upload-image`.
///
/// Every field is optional on the wire: the service omits the narrative field
/// for older analyzers and drops everything but `success`/`error` on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadImageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<AnalysisPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_diagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadImageResponse {
    /// Text to present for a successful analysis: the narrative field when it
    /// carries anything, otherwise the plain analysis result.
    pub fn display_text(&self) -> String {
        if let Some(narrative) = self
            .circuit_analysis
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        {
            return narrative.to_string();
        }
        self.analysis_result
            .as_ref()
            .map(AnalysisPayload::to_markdown)
            .unwrap_or_default()
    }
}

/// `analysis_result` is free text from newer analyzers and a structured
/// component summary from the schema-driven one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Text(String),
    Summary(CircuitSummary),
    Other(Value),
}

impl AnalysisPayload {
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Summary(summary) => summary.to_markdown(),
            Self::Other(value) => {
                let pretty =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                format!("```json\n{pretty}\n```")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub resistors: u32,
    pub resistor_value: String,
    pub leds: u32,
    pub led_colors: Vec<String>,
    pub grounding: bool,
}

impl CircuitSummary {
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Circuit summary\n\n");
        out.push_str(&format!("- **Resistors:** {}", self.resistors));
        if !self.resistor_value.trim().is_empty() {
            out.push_str(&format!(" ({})", self.resistor_value.trim()));
        }
        out.push('\n');
        out.push_str(&format!("- **LEDs:** {}", self.leds));
        if !self.led_colors.is_empty() {
            out.push_str(&format!(" ({})", self.led_colors.join(", ")));
        }
        out.push('\n');
        let grounded = if self.grounding { "yes" } else { "no" };
        out.push_str(&format!("- **Grounded:** {grounded}\n"));
        out
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}
