use serde::Serialize;

/// The fixed venue catalog. Venues are reference data in this deployment:
/// availability is derived from the event store, never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VenueKind {
    Indoor,
    Outdoor,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueImage {
    pub url: &'static str,
    pub alt: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Venue {
    pub id: i32,
    pub name: &'static str,
    pub capacity: i32,
    pub kind: VenueKind,
    pub catering: bool,
    pub menu_link: Option<&'static str>,
    pub images: &'static [VenueImage],
}

const VENUES: &[Venue] = &[
    Venue {
        id: 1,
        name: "Grand Ballroom",
        capacity: 500,
        kind: VenueKind::Indoor,
        catering: true,
        menu_link: Some("/menus/grand-ballroom.pdf"),
        images: &[
            VenueImage {
                url: "/venues/grand-ballroom-1.jpg",
                alt: "Grand Ballroom Main Hall",
            },
            VenueImage {
                url: "/venues/grand-ballroom-2.jpg",
                alt: "Grand Ballroom Stage Area",
            },
        ],
    },
    Venue {
        id: 2,
        name: "Garden Terrace",
        capacity: 200,
        kind: VenueKind::Outdoor,
        catering: true,
        menu_link: Some("/menus/garden-terrace.pdf"),
        images: &[
            VenueImage {
                url: "/venues/garden-terrace-1.jpg",
                alt: "Garden Terrace Overview",
            },
            VenueImage {
                url: "/venues/garden-terrace-2.jpg",
                alt: "Garden Terrace Seating Area",
            },
        ],
    },
    Venue {
        id: 3,
        name: "Conference Hall",
        capacity: 300,
        kind: VenueKind::Indoor,
        catering: false,
        menu_link: None,
        images: &[VenueImage {
            url: "/venues/conference-hall-1.jpg",
            alt: "Conference Hall Main View",
        }],
    },
];

pub fn all() -> &'static [Venue] {
    VENUES
}

pub fn find(id: i32) -> Option<&'static Venue> {
    VENUES.iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_is_populated() {
        assert_eq!(all().len(), 3);
    }

    #[test]
    fn test_find_known_venue() {
        let venue = find(2).expect("venue 2 should exist");
        assert_eq!(venue.name, "Garden Terrace");
        assert_eq!(venue.capacity, 200);
        assert_eq!(venue.kind, VenueKind::Outdoor);
    }

    #[test]
    fn test_find_unknown_venue() {
        assert!(find(99).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<i32> = all().iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }
}
