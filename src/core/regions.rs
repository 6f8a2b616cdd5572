//! Cloud Build regions offered for selection.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
}

pub const REGIONS: &[Region] = &[
    Region { id: "global", name: "Global" },
    Region { id: "us-central1", name: "US Central 1 (Iowa)" },
    Region { id: "us-east1", name: "US East 1 (South Carolina)" },
    Region { id: "us-east4", name: "US East 4 (Northern Virginia)" },
    Region { id: "us-west1", name: "US West 1 (Oregon)" },
    Region { id: "us-west2", name: "US West 2 (Los Angeles)" },
    Region { id: "us-west3", name: "US West 3 (Salt Lake City)" },
    Region { id: "us-west4", name: "US West 4 (Las Vegas)" },
    Region { id: "europe-west1", name: "Europe West 1 (Belgium)" },
    Region { id: "europe-west2", name: "Europe West 2 (London)" },
    Region { id: "europe-west3", name: "Europe West 3 (Frankfurt)" },
    Region { id: "europe-west4", name: "Europe West 4 (Netherlands)" },
    Region { id: "europe-west6", name: "Europe West 6 (Zurich)" },
    Region { id: "asia-east1", name: "Asia East 1 (Taiwan)" },
    Region { id: "asia-northeast1", name: "Asia Northeast 1 (Tokyo)" },
    Region { id: "asia-southeast1", name: "Asia Southeast 1 (Singapore)" },
    Region { id: "asia-south1", name: "Asia South 1 (Mumbai)" },
    Region { id: "australia-southeast1", name: "Australia Southeast 1 (Sydney)" },
];

pub fn find(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}

/// Display name for a region id, or the id itself when unknown.
pub fn display_name(id: &str) -> &str {
    find(id).map(|r| r.name).unwrap_or(id)
}

pub fn ids() -> Vec<String> {
    REGIONS.iter().map(|r| r.id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_is_first() {
        assert_eq!(REGIONS[0].id, "global");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name("europe-west2"), "Europe West 2 (London)");
        assert_eq!(display_name("mars-north1"), "mars-north1");
    }
}
