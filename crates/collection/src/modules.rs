use crate::models::IssueRecord;

/// Derives a module/subsystem label for an issue from its other fields.
///
/// This is the extension point behind `IssueCollection::guess_modules`.
/// Issues for which no label is returned are stored with an empty module
/// and left out of the per-module counts.
pub trait ModuleGuesser {
    fn guess(&self, issue: &IssueRecord) -> Option<String>;
}

/// Default guesser: never assigns a module.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModuleGuess;

impl ModuleGuesser for NoModuleGuess {
    fn guess(&self, _issue: &IssueRecord) -> Option<String> {
        None
    }
}

impl<F> ModuleGuesser for F
where
    F: Fn(&IssueRecord) -> Option<String>,
{
    fn guess(&self, issue: &IssueRecord) -> Option<String> {
        self(issue)
    }
}
