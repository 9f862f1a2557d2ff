use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::WeightRange;
use crate::network::network::Network;

/// Hidden layers used when nothing else is configured.
pub const DEFAULT_LAYER_LIST: &str = "32,16";

/// Serializable description of a network's shape and activation.
///
/// `widths` lists every boundary: `[input, hidden.., output]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub widths: Vec<usize>,
    #[serde(default)]
    pub activation: ActivationFunction,
    #[serde(default)]
    pub weight_range: WeightRange,
}

impl NetworkSpec {
    /// A `2 -> hidden.. -> 1` spec, the shape the canvas front-ends train.
    pub fn plane(hidden: &[usize]) -> NetworkSpec {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(2);
        widths.extend_from_slice(hidden);
        widths.push(1);
        NetworkSpec {
            widths,
            activation: ActivationFunction::default(),
            weight_range: WeightRange::default(),
        }
    }

    /// Fails unless the spec maps `(x, y)` to a single value.
    pub fn ensure_plane(&self) -> Result<()> {
        let input = self.widths.first().copied().unwrap_or(0);
        let output = self.widths.last().copied().unwrap_or(0);
        if self.widths.len() < 2 || input != 2 || output != 1 {
            return Err(NnError::NotPlanar { input, output });
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Network> {
        Network::with_range(&self.widths, self.weight_range, &mut rand::thread_rng())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for NetworkSpec {
    fn default() -> Self {
        NetworkSpec::plane(&[32, 16])
    }
}

/// Parses a list of positive integers separated by `,`, `:` or `;`.
///
/// Empty items (`"4,,8"`, trailing separators) are skipped.
pub fn parse_layer_list(list: &str) -> Result<Vec<usize>> {
    let widths = list
        .split([',', ':', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| -> Result<usize> {
            let n: usize = item
                .parse()
                .map_err(|_| NnError::InvalidNumber(item.to_owned()))?;
            if n == 0 {
                return Err(NnError::InvalidList("layer widths must be at least 1".to_owned()));
            }
            Ok(n)
        })
        .collect::<Result<Vec<usize>>>()?;
    if widths.is_empty() {
        return Err(NnError::InvalidList(format!("no widths in \"{list}\"")));
    }
    Ok(widths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_separator() {
        assert_eq!(parse_layer_list("32,16").unwrap(), vec![32, 16]);
        assert_eq!(parse_layer_list("8:4;2").unwrap(), vec![8, 4, 2]);
        assert_eq!(parse_layer_list(" 3 ,").unwrap(), vec![3]);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(matches!(parse_layer_list("4,0"), Err(NnError::InvalidList(_))));
        assert!(matches!(parse_layer_list("4,x"), Err(NnError::InvalidNumber(s)) if s == "x"));
        assert!(parse_layer_list("").is_err());
    }

    #[test]
    fn default_matches_layer_list() {
        let hidden = parse_layer_list(DEFAULT_LAYER_LIST).unwrap();
        assert_eq!(NetworkSpec::default(), NetworkSpec::plane(&hidden));
    }

    #[test]
    fn spec_round_trips_through_json_defaults() {
        let spec: NetworkSpec = serde_json::from_str(r#"{"widths":[2,3,1]}"#).unwrap();
        assert_eq!(spec.activation, ActivationFunction::Tanh);
        assert_eq!(spec.weight_range, WeightRange::default());
        let net = spec.build().unwrap();
        assert_eq!(net.widths(), vec![2, 3, 1]);
    }

    #[test]
    fn plane_check_rejects_other_shapes() {
        assert!(NetworkSpec::plane(&[4]).ensure_plane().is_ok());
        assert!(NetworkSpec::plane(&[]).ensure_plane().is_ok());

        let wide_input = NetworkSpec { widths: vec![3, 4, 1], ..NetworkSpec::default() };
        assert!(matches!(
            wide_input.ensure_plane(),
            Err(NnError::NotPlanar { input: 3, output: 1 })
        ));
        let two_outputs = NetworkSpec { widths: vec![2, 2], ..NetworkSpec::default() };
        assert!(matches!(two_outputs.ensure_plane(), Err(NnError::NotPlanar { input: 2, output: 2 })));
        let single = NetworkSpec { widths: vec![2], ..NetworkSpec::default() };
        assert!(single.ensure_plane().is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = std::env::temp_dir().join(format!("pixnn-spec-{}.json", std::process::id()));
        let path = path.to_str().unwrap().to_owned();
        let spec = NetworkSpec {
            widths: vec![2, 5, 3, 1],
            activation: ActivationFunction::Sigmoid,
            weight_range: WeightRange::new(-0.5, 0.25).unwrap(),
        };
        spec.save_json(&path).unwrap();
        let loaded = NetworkSpec::load_json(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), spec);
    }
}
