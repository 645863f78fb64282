/// Looks up the current value of a script variable
///
/// Implemented by the scripting host. Returning `None` means the name could
/// not be evaluated; the client then sees the value `undefined`.
///
/// Any `Fn(&str) -> Option<String>` closure is an evaluator:
///
/// ```
/// use debugger::Evaluator;
///
/// let evaluator = |name: &str| (name == "x").then(|| "42".to_string());
/// assert_eq!(evaluator.evaluate("x"), Some("42".to_string()));
/// assert_eq!(evaluator.evaluate("y"), None);
/// ```
pub trait Evaluator: Send {
    fn evaluate(&self, name: &str) -> Option<String>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> Option<String> + Send,
{
    fn evaluate(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Evaluator used until the host installs one; knows no variables
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn evaluate(&self, _name: &str) -> Option<String> {
        None
    }
}
