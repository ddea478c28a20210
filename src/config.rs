//! Configuración del launcher.
//! Carga variables de entorno (.env una sola vez) y las traduce a
//! `ShellflowConfig`. Valores inválidos caen al valor por defecto con warning.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use shell_core::constants::DEFAULT_COMPUTER;

use crate::launch::CommandPolicy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_WORKDIR: &str = "SHELLFLOW_WORKDIR";
pub const ENV_COMPUTER: &str = "SHELLFLOW_COMPUTER";
pub const ENV_RESOLVE_COMMAND: &str = "SHELLFLOW_RESOLVE_COMMAND";
pub const ENV_USE_SYMLINKS: &str = "SHELLFLOW_USE_SYMLINKS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellflowConfig {
    /// Raíz de los directorios de trabajo (`<raíz>/<job uuid>`).
    pub workdir_root: PathBuf,
    /// Computer por defecto.
    pub computer: String,
    pub command_policy: CommandPolicy,
    /// Política por defecto para carpetas remotas.
    pub use_symlinks: bool,
}

impl Default for ShellflowConfig {
    fn default() -> Self {
        Self { workdir_root: env::temp_dir().join("shellflow"),
               computer: DEFAULT_COMPUTER.to_string(),
               command_policy: CommandPolicy::Resolve,
               use_symlinks: false }
    }
}

fn parse_bool(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("{key}={raw:?} no es un booleano válido; se usa el valor por defecto");
            None
        }
    }
}

impl ShellflowConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables (el entorno real en `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let workdir_root = lookup(ENV_WORKDIR).filter(|v| !v.trim().is_empty())
                                              .map(PathBuf::from)
                                              .unwrap_or(defaults.workdir_root);
        let computer = lookup(ENV_COMPUTER).filter(|v| !v.trim().is_empty())
                                           .unwrap_or(defaults.computer);
        let command_policy = match lookup(ENV_RESOLVE_COMMAND).and_then(|v| parse_bool(ENV_RESOLVE_COMMAND, &v)) {
            Some(true) | None => CommandPolicy::Resolve,
            Some(false) => CommandPolicy::AsGiven,
        };
        let use_symlinks = lookup(ENV_USE_SYMLINKS).and_then(|v| parse_bool(ENV_USE_SYMLINKS, &v))
                                                   .unwrap_or(defaults.use_symlinks);
        Self { workdir_root,
               computer,
               command_policy,
               use_symlinks }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = ShellflowConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, ShellflowConfig::default());
        assert_eq!(cfg.computer, "localhost");
        assert!(cfg.workdir_root.ends_with("shellflow"));
    }

    #[test]
    fn reads_all_variables() {
        let cfg = ShellflowConfig::from_lookup(lookup(&[(ENV_WORKDIR, "/scratch/jobs"),
                                                        (ENV_COMPUTER, "cluster"),
                                                        (ENV_RESOLVE_COMMAND, "false"),
                                                        (ENV_USE_SYMLINKS, "YES")]));
        assert_eq!(cfg.workdir_root, PathBuf::from("/scratch/jobs"));
        assert_eq!(cfg.computer, "cluster");
        assert_eq!(cfg.command_policy, CommandPolicy::AsGiven);
        assert!(cfg.use_symlinks);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = ShellflowConfig::from_lookup(lookup(&[(ENV_RESOLVE_COMMAND, "maybe"), (ENV_USE_SYMLINKS, "2")]));
        assert_eq!(cfg.command_policy, CommandPolicy::Resolve);
        assert!(!cfg.use_symlinks);
    }
}
