//! Service layer for the holiday feed.
//!
//! This module contains the business logic for:
//! - CSV parsing (`HolidayCsvParser`)
//! - Makeup day cross-referencing (`RelatedHolidayResolver`)
//! - Realtime closure alerts (`AlertService`, `CityAlertFilter`)

mod alerts;
mod csv_parser;
mod related;

pub use alerts::{AlertService, CityAlertFilter};
pub use csv_parser::HolidayCsvParser;
pub use related::{DateMention, RelatedHolidayResolver};
