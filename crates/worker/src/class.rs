/// Execution classes used for scheduled task observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskClass {
	/// Work that directly follows user input (debounced change handling).
	#[default]
	Interactive,
	/// Periodic or deadline work that may lag behind input.
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
