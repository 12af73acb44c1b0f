//! Static catalogs the task universe is enumerated from.

use serde::{Deserialize, Serialize};

/// An industry with its own landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// URL slug, unique within the catalog
    pub slug: String,

    /// Human-readable name, also used as the news query
    pub name: String,
}

impl Industry {
    /// Create a new industry entry.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// A city with its own landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// URL slug of the city, unique within the catalog
    pub city_slug: String,

    /// City display name
    pub city: String,

    /// Country display name
    pub country: String,
}

impl Location {
    /// Create a new location entry.
    pub fn new(
        city_slug: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            city_slug: city_slug.into(),
            city: city.into(),
            country: country.into(),
        }
    }
}

/// Industry and location catalogs, in their canonical order.
///
/// Order matters: the task universe and therefore the cursor positions are
/// derived from it. Appending entries is safe; reordering shifts coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Industries in catalog order
    pub industries: Vec<Industry>,

    /// Locations in catalog order
    pub locations: Vec<Location>,
}

impl Catalog {
    /// Create a catalog from explicit lists.
    pub fn new(industries: Vec<Industry>, locations: Vec<Location>) -> Self {
        Self {
            industries,
            locations,
        }
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        let industries = [
            ("plumbing", "Plumbing"),
            ("hvac", "HVAC"),
            ("electrical", "Electrical"),
            ("roofing", "Roofing"),
            ("landscaping", "Landscaping"),
            ("dental", "Dental"),
            ("legal", "Legal"),
            ("real-estate", "Real Estate"),
            ("auto-repair", "Auto Repair"),
            ("cleaning", "Cleaning"),
            ("pest-control", "Pest Control"),
            ("veterinary", "Veterinary"),
        ]
        .into_iter()
        .map(|(slug, name)| Industry::new(slug, name))
        .collect();

        let locations = [
            ("new-york", "New York", "United States"),
            ("los-angeles", "Los Angeles", "United States"),
            ("chicago", "Chicago", "United States"),
            ("houston", "Houston", "United States"),
            ("phoenix", "Phoenix", "United States"),
            ("toronto", "Toronto", "Canada"),
            ("vancouver", "Vancouver", "Canada"),
            ("london", "London", "United Kingdom"),
            ("manchester", "Manchester", "United Kingdom"),
            ("sydney", "Sydney", "Australia"),
        ]
        .into_iter()
        .map(|(slug, city, country)| Location::new(slug, city, country))
        .collect();

        Self::new(industries, locations)
    }

    /// Look up an industry by slug.
    pub fn industry(&self, slug: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.slug == slug)
    }

    /// Look up a location by city slug.
    pub fn location(&self, city_slug: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.city_slug == city_slug)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
