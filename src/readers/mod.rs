pub mod granule_reader;
#[cfg(feature = "netcdf")]
pub mod netcdf_reader;
pub mod polygon_reader;
pub mod table_reader;

pub use granule_reader::{GranuleArrays, GranuleReader, UnsupportedGranuleReader};
#[cfg(feature = "netcdf")]
pub use netcdf_reader::NetCdfGranuleReader;
pub use polygon_reader::{CountryPolygon, PolygonReader};
pub use table_reader::TableReader;
