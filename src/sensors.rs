/// Sensor location registry for the east Houston flood risk service.
///
/// Defines the canonical list of water-level sensor sites the service
/// reports risk for, along with their coordinates and area tags. This is
/// the single source of truth for sensor locations — other modules should
/// reference entries from here rather than hardcoding names.
///
/// The registry is static, immutable, and loaded once for the lifetime of
/// the process. The service currently has no per-location sensor features,
/// so these entries only drive the per-sensor fan-out of the base risk
/// score and the map display.

/// Metadata for a single water-level sensor site.
pub struct SensorLocation {
    /// Site name as shown on the dashboard.
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Coarse area tag used for grouping on the map.
    pub area: &'static str,
}

/// All monitored sensor sites, in the fixed order risk responses are
/// emitted in. The first cluster sits along the East Fork drainage near
/// Porter; the "West" cluster covers the pond network off the Katy prairie.
pub static SENSOR_REGISTRY: &[SensorLocation] = &[
    SensorLocation { name: "Avalon", latitude: 30.09222, longitude: -95.25000, area: "Central" },
    SensorLocation { name: "Highway 59", latitude: 30.09139, longitude: -95.24111, area: "Central East" },
    SensorLocation { name: "Sorters North", latitude: 30.10083, longitude: -95.27167, area: "North" },
    SensorLocation { name: "Sorters South", latitude: 30.07167, longitude: -95.26472, area: "South" },
    SensorLocation { name: "Southwood Oaks at LaVone", latitude: 30.09139, longitude: -95.25806, area: "Central" },
    SensorLocation { name: "Brentwood Oaks", latitude: 30.08028, longitude: -95.25028, area: "Central South" },
    SensorLocation { name: "Bitter Root", latitude: 30.09667, longitude: -95.26722, area: "North Central" },
    SensorLocation { name: "Southwood Oaks (Alt)", latitude: 30.09222, longitude: -95.26000, area: "Central" },
    SensorLocation { name: "Rock Creek Dr", latitude: 30.07167, longitude: -95.25500, area: "South" },
    SensorLocation { name: "North Pond", latitude: 29.99806, longitude: -95.85750, area: "West" },
    SensorLocation { name: "South Pond", latitude: 29.99200, longitude: -95.85306, area: "West" },
    SensorLocation { name: "Buffalo Lake", latitude: 29.99333, longitude: -95.85111, area: "West" },
    SensorLocation { name: "Rock Hollow", latitude: 29.99200, longitude: -95.85111, area: "West" },
];

/// Looks up a sensor by name. Returns `None` if not found.
pub fn find_sensor(name: &str) -> Option<&'static SensorLocation> {
    SENSOR_REGISTRY.iter().find(|s| s.name == name)
}

/// Returns the names of all registered sensors in registry order.
pub fn all_sensor_names() -> Vec<&'static str> {
    SENSOR_REGISTRY.iter().map(|s| s.name).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
