// Results flow: hands the submitted profile to the recommendation service and
// decorates the ranked results for display.

pub mod handlers;
