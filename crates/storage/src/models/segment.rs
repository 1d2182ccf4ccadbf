use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the two fixed race courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
pub enum Segment {
    #[serde(rename = "5k")]
    FiveK,
    #[serde(rename = "10k")]
    TenK,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveK => "5k",
            Self::TenK => "10k",
        }
    }

    /// Nominal course length used for pace.
    pub fn distance_km(&self) -> f64 {
        match self {
            Self::FiveK => 5.0,
            Self::TenK => 10.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FiveK => "5km — Libeňák",
            Self::TenK => "10km — Stromovka",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5k" => Ok(Self::FiveK),
            "10k" => Ok(Self::TenK),
            other => Err(format!("unknown segment '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("5k".parse::<Segment>(), Ok(Segment::FiveK));
        assert_eq!("10k".parse::<Segment>(), Ok(Segment::TenK));
        assert!("5K".parse::<Segment>().is_err());
        assert!(" 5k".parse::<Segment>().is_err());
        assert!("marathon".parse::<Segment>().is_err());
    }

    #[test]
    fn test_distances() {
        assert_eq!(Segment::FiveK.distance_km(), 5.0);
        assert_eq!(Segment::TenK.distance_km(), 10.0);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Segment::TenK).unwrap(), "\"10k\"");
        let parsed: Segment = serde_json::from_str("\"5k\"").unwrap();
        assert_eq!(parsed, Segment::FiveK);
    }
}
