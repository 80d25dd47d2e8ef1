//! Declarative modules described by a `module.ini` manifest.
//!
//! ```ini
//! [module]
//! name = math_module
//!
//! [exports]
//! add = a + b
//! subtract = a - b
//! multiply = a * b
//! ```
//!
//! Each export is either a single operand or `operand op operand`, with
//! tokens separated by whitespace. Operands are `a`, `b` or a numeric
//! literal; operators are `+ - * /`. Unknown export names are skipped so
//! newer artifacts stay loadable by older hosts.

use std::collections::BTreeMap;
use std::path::Path;

use ini::Ini;
use tracing::warn;

use super::plugin::{Operation, Plugin};

/// Manifest filename inside the unit directory.
pub const MANIFEST_FILENAME: &str = "module.ini";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    A,
    B,
    Literal(f64),
}

impl Operand {
    fn parse(token: &str) -> Result<Self, String> {
        match token {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            _ => token
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Literal)
                .ok_or_else(|| format!("invalid operand '{}'", token)),
        }
    }

    fn value(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::A => a,
            Self::B => b,
            Self::Literal(n) => *n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Expr {
    Operand(Operand),
    Binary(Operand, char, Operand),
}

impl Expr {
    fn parse(source: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = source.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => Ok(Self::Operand(Operand::parse(single)?)),
            [lhs, op, rhs] => {
                let op = match *op {
                    "+" => '+',
                    "-" => '-',
                    "*" => '*',
                    "/" => '/',
                    other => return Err(format!("unknown operator '{}'", other)),
                };
                Ok(Self::Binary(Operand::parse(lhs)?, op, Operand::parse(rhs)?))
            }
            [] => Err("empty expression".to_string()),
            _ => Err(format!("cannot parse expression '{}'", source)),
        }
    }

    fn eval(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Operand(x) => x.value(a, b),
            Self::Binary(lhs, op, rhs) => {
                let (l, r) = (lhs.value(a, b), rhs.value(a, b));
                match op {
                    '+' => l + r,
                    '-' => l - r,
                    '*' => l * r,
                    _ => l / r,
                }
            }
        }
    }
}

/// A module whose exports are defined by a manifest.
#[derive(Debug)]
pub struct ManifestPlugin {
    exports: BTreeMap<Operation, Expr>,
}

impl ManifestPlugin {
    /// Read and validate a manifest.
    pub fn load(artifact: &str, manifest_path: &Path) -> Result<Self, String> {
        let ini = Ini::load_from_file(manifest_path)
            .map_err(|e| format!("failed to read {}: {}", manifest_path.display(), e))?;
        Self::from_ini(artifact, &ini)
    }

    /// Parse a manifest from text.
    pub fn parse(artifact: &str, source: &str) -> Result<Self, String> {
        let ini = Ini::load_from_str(source).map_err(|e| format!("invalid manifest: {}", e))?;
        Self::from_ini(artifact, &ini)
    }

    fn from_ini(artifact: &str, ini: &Ini) -> Result<Self, String> {
        if let Some(name) = ini.section(Some("module")).and_then(|s| s.get("name")) {
            if name != artifact {
                return Err(format!(
                    "manifest declares module '{}', expected '{}'",
                    name, artifact
                ));
            }
        }

        let section = ini
            .section(Some("exports"))
            .ok_or_else(|| "manifest has no [exports] section".to_string())?;

        let mut exports = BTreeMap::new();
        for (key, value) in section.iter() {
            let op = match key.parse::<Operation>() {
                Ok(op) => op,
                Err(_) => {
                    warn!(artifact, export = key, "Skipping unknown export");
                    continue;
                }
            };
            let expr = Expr::parse(value).map_err(|e| format!("export '{}': {}", key, e))?;
            exports.insert(op, expr);
        }

        Ok(Self { exports })
    }
}

impl Plugin for ManifestPlugin {
    fn exports(&self) -> Vec<Operation> {
        self.exports.keys().copied().collect()
    }

    fn call(&self, op: Operation, a: f64, b: f64) -> Option<f64> {
        self.exports.get(&op).map(|expr| expr.eval(a, b))
    }

    fn kind(&self) -> &'static str {
        "manifest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATH: &str = "[module]\nname = math_module\n\n[exports]\nadd = a + b\nsubtract = a - b\nmultiply = a * b\n";

    #[test]
    fn test_parse_and_call() {
        let plugin = ManifestPlugin::parse("math_module", MATH).unwrap();

        assert_eq!(plugin.call(Operation::Add, 2.0, 3.0), Some(5.0));
        assert_eq!(plugin.call(Operation::Subtract, 2.0, 3.0), Some(-1.0));
        assert_eq!(plugin.call(Operation::Multiply, 2.5, 4.0), Some(10.0));
        assert_eq!(
            plugin.exports(),
            vec![Operation::Add, Operation::Subtract, Operation::Multiply]
        );
    }

    #[test]
    fn test_partial_exports() {
        let plugin = ManifestPlugin::parse("math_module", "[exports]\nadd = a + b\n").unwrap();
        assert_eq!(plugin.call(Operation::Multiply, 1.0, 1.0), None);
    }

    #[test]
    fn test_literals_and_single_operand() {
        let plugin =
            ManifestPlugin::parse("m", "[exports]\nadd = a + 1.5\nmultiply = b\nsubtract = 10 - a\n")
                .unwrap();

        assert_eq!(plugin.call(Operation::Add, 1.0, 0.0), Some(2.5));
        assert_eq!(plugin.call(Operation::Multiply, 7.0, 3.0), Some(3.0));
        assert_eq!(plugin.call(Operation::Subtract, 4.0, 0.0), Some(6.0));
    }

    #[test]
    fn test_unknown_exports_are_skipped() {
        let plugin =
            ManifestPlugin::parse("m", "[exports]\nadd = a + b\npower = a * a\n").unwrap();
        assert_eq!(plugin.exports(), vec![Operation::Add]);
    }

    #[test]
    fn test_definition_errors() {
        assert!(ManifestPlugin::parse("m", "[module]\nname = m\n").is_err());
        assert!(ManifestPlugin::parse("m", "[exports]\nadd = a ^ b\n").is_err());
        assert!(ManifestPlugin::parse("m", "[exports]\nadd = a + c\n").is_err());
        assert!(ManifestPlugin::parse("m", "[exports]\nadd = a + b + 1\n").is_err());
        assert!(ManifestPlugin::parse("m", "[exports]\nadd =\n").is_err());
    }

    #[test]
    fn test_name_mismatch_rejected() {
        let err = ManifestPlugin::parse("other_module", MATH).unwrap_err();
        assert!(err.contains("expected 'other_module'"));
    }
}
