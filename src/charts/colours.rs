use crate::telemetry::SessionInfo;

/// Used when the provider has no team colour for a driver, by request position.
const FALLBACK: &[&str] = &["#3671C6", "#E8002D", "#27F4D2", "#FF8000", "#229971"];

/// How one driver is drawn: code for lookups, label for legends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStyle {
    pub code: String,
    pub label: String,
    pub colour: String,
}

impl DriverStyle {
    /// `label` is the raw form value (`"VER Max Verstappen"`), `index` the
    /// driver's position in the request.
    pub fn resolve(session: &SessionInfo, label: &str, index: usize) -> Self {
        let code = crate::telemetry::driver_code(label).to_ascii_uppercase();
        let colour = session
            .driver(&code)
            .and_then(|d| d.team_colour.as_deref())
            .and_then(normalise_hex)
            .unwrap_or_else(|| FALLBACK[index % FALLBACK.len()].to_string());

        Self {
            code,
            label: label.trim().to_string(),
            colour,
        }
    }
}

/// Styles for a two-driver comparison. Teammates share a team colour, so the
/// second driver falls back to a palette colour that differs from the first.
pub fn resolve_pair(session: &SessionInfo, labels: [&str; 2]) -> [DriverStyle; 2] {
    let first = DriverStyle::resolve(session, labels[0], 0);
    let mut second = DriverStyle::resolve(session, labels[1], 1);

    if second.colour == first.colour {
        second.colour = FALLBACK
            .iter()
            .find(|c| **c != first.colour)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "#FFFFFF".to_string());
    }

    [first, second]
}

/// `"3671c6"` / `"#3671C6"` to `"#3671C6"`; anything else is rejected.
fn normalise_hex(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}
