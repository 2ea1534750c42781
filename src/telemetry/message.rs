//! Wire format of the end-of-run broadcast.
//!
//! One line of text, four keyed values with three decimals:
//! `a:<mean_accel>,v:<mean_vel>,vm:<vmax>,t:<tau>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::RunSummary;
use crate::error::TelemetryError;

/// The four scalars broadcast after a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub mean_accel: f64,
    pub mean_velocity: f64,
    pub vmax: f64,
    pub tau: f64,
}

impl From<&RunSummary> for TelemetryMessage {
    fn from(summary: &RunSummary) -> Self {
        Self {
            mean_accel: summary.mean_accel,
            mean_velocity: summary.mean_velocity,
            vmax: summary.fit.vmax,
            tau: summary.fit.tau,
        }
    }
}

impl fmt::Display for TelemetryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a:{:.3},v:{:.3},vm:{:.3},t:{:.3}",
            self.mean_accel, self.mean_velocity, self.vmax, self.tau
        )
    }
}

impl FromStr for TelemetryMessage {
    type Err = TelemetryError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let mut mean_accel = None;
        let mut mean_velocity = None;
        let mut vmax = None;
        let mut tau = None;

        for field in payload.trim().split(',') {
            let (key, value) = field.split_once(':').ok_or_else(|| TelemetryError::Malformed {
                reason: format!("field {:?} has no ':'", field),
            })?;
            let value: f64 = value.trim().parse().map_err(|_| TelemetryError::Malformed {
                reason: format!("value {:?} for key {} is not a number", value, key),
            })?;

            let slot = match key.trim() {
                "a" => &mut mean_accel,
                "v" => &mut mean_velocity,
                "vm" => &mut vmax,
                "t" => &mut tau,
                other => {
                    return Err(TelemetryError::Malformed {
                        reason: format!("unknown key {:?}", other),
                    })
                }
            };
            if slot.replace(value).is_some() {
                return Err(TelemetryError::Malformed {
                    reason: format!("duplicate key {}", key.trim()),
                });
            }
        }

        let missing = |name: &str| TelemetryError::Malformed {
            reason: format!("missing key {}", name),
        };
        Ok(Self {
            mean_accel: mean_accel.ok_or_else(|| missing("a"))?,
            mean_velocity: mean_velocity.ok_or_else(|| missing("v"))?,
            vmax: vmax.ok_or_else(|| missing("vm"))?,
            tau: tau.ok_or_else(|| missing("t"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_three_decimals() {
        let message = TelemetryMessage {
            mean_accel: 0.081_795,
            mean_velocity: 0.370_86,
            vmax: 0.403_99,
            tau: 0.0,
        };
        assert_eq!(message.to_string(), "a:0.082,v:0.371,vm:0.404,t:0.000");
    }

    #[test]
    fn test_parse_accepts_any_order() {
        let message: TelemetryMessage = "t:0.396,vm:0.404,a:0.082,v:0.371".parse().unwrap();
        assert_eq!(message.tau, 0.396);
        assert_eq!(message.vmax, 0.404);
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        let err = "a:1.000,v:2.000,vm:3.000"
            .parse::<TelemetryMessage>()
            .unwrap_err();
        assert_eq!(
            err,
            TelemetryError::Malformed {
                reason: "missing key t".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_duplicate_keys() {
        assert!("a:1,v:2,vm:3,t:4,x:5".parse::<TelemetryMessage>().is_err());
        assert!("a:1,a:2,v:2,vm:3,t:4".parse::<TelemetryMessage>().is_err());
        assert!("a:1,v:two,vm:3,t:4".parse::<TelemetryMessage>().is_err());
        assert!("garbage".parse::<TelemetryMessage>().is_err());
    }
}
