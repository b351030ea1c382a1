pub const PATH_LATEST: &str = "/api/latest";
pub const PATH_WATER: &str = "/api/water";
pub const PATH_AUTO: &str = "/api/auto";
