/// The key written into the first event of any session the core creates
/// solely to run an analysis or summarization prompt (spec §4.8, §9's
/// "single authoritative mechanism" resolution). Listing and indexing
/// operations treat any file carrying this key as not-a-user-session,
/// regardless of whether the best-effort delete that normally follows
/// actually succeeded.
pub const HELPER_MARKER_KEY: &str = "sessionctl_helper";

/// A helper session is further required to carry few enough messages that
/// it can't be mistaken for a real conversation even if the marker is
/// stripped by the agent CLI before writing (spec §4.8).
pub const HELPER_MAX_MESSAGE_EVENTS: usize = 5;
