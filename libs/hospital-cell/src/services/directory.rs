use crate::models::Hospital;

/// Bundled hospital directory for Bengaluru.
pub const HOSPITALS: &[Hospital] = &[
    Hospital {
        name: "Victoria Hospital",
        address: "Fort Road, Kalasipalya, Bengaluru 560002",
        phone: "080 2670 1150",
        latitude: 12.9636,
        longitude: 77.5738,
    },
    Hospital {
        name: "Fortis Hospital Cunningham Road",
        address: "14 Cunningham Road, Bengaluru 560052",
        phone: "080 4199 4444",
        latitude: 12.9860,
        longitude: 77.5920,
    },
    Hospital {
        name: "Manipal Hospital Old Airport Road",
        address: "98 HAL Old Airport Road, Bengaluru 560017",
        phone: "080 2502 4444",
        latitude: 12.9592,
        longitude: 77.6485,
    },
    Hospital {
        name: "St. John's Medical College Hospital",
        address: "Sarjapur Road, Koramangala, Bengaluru 560034",
        phone: "080 2206 5000",
        latitude: 12.9300,
        longitude: 77.6200,
    },
    Hospital {
        name: "Apollo Hospitals Bannerghatta Road",
        address: "154/11 Bannerghatta Road, Bengaluru 560076",
        phone: "080 2630 4050",
        latitude: 12.8959,
        longitude: 77.5985,
    },
    Hospital {
        name: "Narayana Health City",
        address: "258/A Bommasandra Industrial Area, Bengaluru 560099",
        phone: "080 7122 2222",
        latitude: 12.8105,
        longitude: 77.6950,
    },
];
