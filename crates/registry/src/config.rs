use std::path::PathBuf;

/// Where a [`Registry`](crate::Registry) looks for grammar definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
	/// Definition directories, highest precedence first. A language found in
	/// an earlier directory shadows the same language in later ones.
	pub search_paths: Vec<PathBuf>,
	/// Consult the embedded definitions after every directory.
	pub bundled: bool,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			search_paths: default_search_paths(),
			bundled: true,
		}
	}
}

impl RegistryConfig {
	/// Only the embedded definitions.
	pub fn bundled_only() -> Self {
		Self {
			search_paths: Vec::new(),
			bundled: true,
		}
	}

	pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.search_paths.push(path.into());
		self
	}
}

/// Directories searched for definitions.
/// Order: `SYNLINE_RUNTIME` env, user config dir, user data dir, exe-relative.
pub fn default_search_paths() -> Vec<PathBuf> {
	let mut dirs = Vec::new();

	if let Some(runtime) = std::env::var_os("SYNLINE_RUNTIME") {
		dirs.push(PathBuf::from(runtime).join("syntax"));
	}

	if let Some(config_dir) = config_dir() {
		dirs.push(config_dir.join("synline").join("syntax"));
	}

	if let Some(data_dir) = data_local_dir() {
		dirs.push(data_dir.join("synline").join("syntax"));
	}

	if let Ok(exe_path) = std::env::current_exe()
		&& let Some(exe_dir) = exe_path.parent()
	{
		dirs.push(exe_dir.join("syntax"));
		dirs.push(exe_dir.join("..").join("share").join("synline").join("syntax"));
	}

	dirs
}

/// The user configuration directory (`$XDG_CONFIG_HOME` on unix).
pub fn config_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_CONFIG_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
	}
	#[cfg(windows)]
	{
		std::env::var_os("APPDATA").map(PathBuf::from)
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

fn data_local_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_DATA_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
	}
	#[cfg(windows)]
	{
		std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}
