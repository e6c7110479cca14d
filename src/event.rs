//! Static event details shown on the invitation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub date: String,
    pub time: String,
    pub location: String,
    pub address: String,
    pub map_link: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            date: "14 de Febrero, 2026".to_string(),
            time: "4:00 PM - 8:00 PM".to_string(),
            location: "Magic Jardín de Fiestas".to_string(),
            address: "Juan Escutia 660, Chapultepec Sur, 58260 Morelia, Mich.".to_string(),
            map_link: "https://www.google.com/maps/search/?api=1&query=Magic+Jardin+de+Fiestas+Juan+Escutia+660+Morelia".to_string(),
        }
    }
}

impl EventDetails {
    /// Label/value rows in display order.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Date", &self.date),
            ("Time", &self.time),
            ("Location", &self.location),
            ("Address", &self.address),
            ("Map", &self.map_link),
        ]
    }
}
