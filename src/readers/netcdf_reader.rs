use crate::error::{ProcessingError, Result};
use crate::readers::granule_reader::{GranuleArrays, GranuleReader};
use crate::utils::dates::CfTimeUnits;
use std::path::Path;

/// Reads OCO-2 Lite granules (`.nc4`/`.h5`) through the netCDF library.
pub struct NetCdfGranuleReader {
    xco2_var: String,
    latitude_var: String,
    longitude_var: String,
    time_var: String,
}

impl NetCdfGranuleReader {
    pub fn new() -> Self {
        Self {
            xco2_var: "xco2".to_string(),
            latitude_var: "latitude".to_string(),
            longitude_var: "longitude".to_string(),
            time_var: "time".to_string(),
        }
    }

    fn read_f64(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<f64>> {
        let var = file.variable(name).ok_or_else(|| ProcessingError::GranuleRead {
            file: path.display().to_string(),
            message: format!("missing variable '{}'", name),
        })?;

        let fill = Self::attr_f64(&var, "_FillValue");
        let values: Vec<f64> = var.get_values(..)?;

        Ok(values
            .into_iter()
            .map(|v| match fill {
                Some(fill) if v == fill => f64::NAN,
                _ => v,
            })
            .collect())
    }

    fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
        var.attribute_value(name)
            .and_then(|r| r.ok())
            .and_then(|v| match v {
                netcdf::AttributeValue::Double(d) => Some(d),
                netcdf::AttributeValue::Float(f) => Some(f as f64),
                netcdf::AttributeValue::Int(i) => Some(i as f64),
                netcdf::AttributeValue::Short(s) => Some(s as f64),
                _ => None,
            })
    }

    fn time_units(var: &netcdf::Variable) -> Result<CfTimeUnits> {
        match var.attribute_value("units").and_then(|r| r.ok()) {
            Some(netcdf::AttributeValue::Str(units)) => CfTimeUnits::parse(&units),
            _ => Ok(CfTimeUnits::default()),
        }
    }
}

impl Default for NetCdfGranuleReader {
    fn default() -> Self {
        Self::new()
    }
}

impl GranuleReader for NetCdfGranuleReader {
    fn read_granule(&self, path: &Path) -> Result<GranuleArrays> {
        let file = netcdf::open(path)?;

        let xco2 = Self::read_f64(&file, &self.xco2_var, path)?;
        let latitude = Self::read_f64(&file, &self.latitude_var, path)?;
        let longitude = Self::read_f64(&file, &self.longitude_var, path)?;
        let raw_time = Self::read_f64(&file, &self.time_var, path)?;

        let units = match file.variable(&self.time_var) {
            Some(var) => Self::time_units(&var)?,
            None => CfTimeUnits::default(),
        };
        let time = raw_time.into_iter().map(|t| units.decode(t)).collect();

        Ok(GranuleArrays {
            xco2,
            latitude,
            longitude,
            time,
        })
    }
}
