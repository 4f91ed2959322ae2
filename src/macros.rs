/// Builds a [`crate::Value`] from a JSON-like literal.
///
/// Arrays and objects recurse element-wise; `null` maps to
/// [`crate::Value::Null`]; every other literal goes through
/// `Value::from`, so booleans, integers, floats, and strings all work
/// unannotated.
///
/// ```rust
/// use toon_temporal::toon;
///
/// let event = toon!({
///     "summary": "Standup",
///     "minutes": 15,
///     "attendees": ["alice", "bob"]
/// });
/// assert!(event.is_object());
/// ```
#[macro_export]
macro_rules! toon {
    ([ $($element:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![ $( $crate::toon!($element) ),* ])
    };
    ({ $($key:literal : $entry:tt),* $(,)? }) => {
        $crate::Value::Object(
            [ $( ($key.to_string(), $crate::toon!($entry)) ),* ]
                .into_iter()
                .collect::<$crate::ValueMap>(),
        )
    };
    (null) => {
        $crate::Value::Null
    };
    ($scalar:expr) => {
        $crate::Value::from($scalar)
    };
}
