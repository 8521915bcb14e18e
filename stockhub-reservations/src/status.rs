use serde::Serialize;

/// Outcome of a reservation request as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReservationStatus {
    #[serde(rename = "Reservation in process")]
    InProcess,
    #[serde(rename = "Reservations are blocked")]
    Blocked,
    #[serde(rename = "Not enough stock available")]
    NotEnoughStock,
    #[serde(rename = "Product not found")]
    ProductNotFound,
    #[serde(rename = "Reservation failed")]
    Failed,
}

impl ReservationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "Reservation in process",
            Self::Blocked => "Reservations are blocked",
            Self::NotEnoughStock => "Not enough stock available",
            Self::ProductNotFound => "Product not found",
            Self::Failed => "Reservation failed",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_client_strings() {
        for status in [
            ReservationStatus::InProcess,
            ReservationStatus::Blocked,
            ReservationStatus::NotEnoughStock,
            ReservationStatus::ProductNotFound,
            ReservationStatus::Failed,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.as_str().to_owned())
            );
        }
    }
}
