pub use geo::GeoInfo;

mod geo;
