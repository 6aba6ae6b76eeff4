//! Fragments: pieces of SQL with holes in them.
//!
//! A fragment is literal SQL text interleaved with values, e.g. `where $age > ` then `42`.  The literal text has the
//! `$path` shorthand translated; the values are kept to one side and end up as positional parameters.  There is no way
//! to get a value into the SQL text through a fragment, and the text itself may not contain parameter markers (`?`,
//! `:name` and so on) outside of literals, since nothing would bind them.
//!
//! Build one with a [FragmentBuilder]:
//!
//! ```
//! use ammo_docstore::Fragment;
//!
//! let f = Fragment::builder().text("where $age > ").value(42).text(" order by $name").build();
//! assert_eq!(f.segments().collect::<Vec<_>>(), vec!["where data->>'$.age' > ", " order by data->>'$.name'"]);
//! ```
use std::sync::Arc;

use smallvec::SmallVec;

use crate::errors::*;
use crate::lexer;
use crate::param::Param;

/// Translated SQL text segments and the values which go between them.
///
/// Always has exactly one more segment than it has values.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    segments: SmallVec<[Arc<str>; 4]>,
    values: SmallVec<[Param; 3]>,
}

/// Builds a [Fragment] one piece at a time.
#[derive(Debug)]
pub struct FragmentBuilder {
    segments: SmallVec<[String; 4]>,
    values: SmallVec<[Param; 3]>,
}

impl Fragment {
    pub fn builder() -> FragmentBuilder {
        FragmentBuilder::new()
    }

    /// Build a fragment from the segments around `values.len()` holes.
    ///
    /// # Panics
    ///
    /// If `segments.len() != values.len() + 1`, or if a segment contains a parameter marker.  Use [Fragment::try_new]
    /// when the parts come from somewhere other than the code itself.
    pub fn new(segments: &[&str], values: Vec<Param>) -> Fragment {
        assert_eq!(
            segments.len(),
            values.len() + 1,
            "A fragment needs exactly one more segment than values"
        );
        Self::from_checked_parts(segments.iter().copied(), values)
            .expect("Fragment text may not contain parameter markers")
    }

    pub fn try_new(segments: &[&str], values: Vec<Param>) -> Result<Fragment> {
        if segments.len() != values.len() + 1 {
            return Err(Error::FragmentArity {
                segments: segments.len(),
                values: values.len(),
            });
        }
        Self::from_checked_parts(segments.iter().copied(), values)
    }

    /// Translate the segments, which must already be one more than the values.
    fn from_checked_parts<'a>(
        segments: impl Iterator<Item = &'a str>,
        values: impl IntoIterator<Item = Param>,
    ) -> Result<Fragment> {
        let segments = segments
            .map(crate::path::translate)
            .collect::<SmallVec<[Arc<str>; 4]>>();
        if let Some(s) = segments.iter().find(|s| lexer::parameter_count(s) > 0) {
            return Err(Error::ParameterInText(s.to_string()));
        }

        Ok(Fragment {
            segments,
            values: values.into_iter().collect(),
        })
    }

    /// A fragment with no holes.
    ///
    /// # Panics
    ///
    /// If `text` contains a parameter marker.
    pub fn raw(text: &str) -> Fragment {
        Self::from_checked_parts(std::iter::once(text), [])
            .expect("Fragment text may not contain parameter markers")
    }

    /// `limit ?`, with the count bound as a parameter.
    pub fn limit(count: u32) -> Fragment {
        Self::from_checked_parts(["limit ", ""].into_iter(), [Param::from(count)])
            .expect("The limit fragment has no markers in its text")
    }

    /// The translated literal text.  There is always one more segment than there are values.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|x| &**x)
    }

    pub fn values(&self) -> &[Param] {
        &self.values[..]
    }

    pub fn hole_count(&self) -> usize {
        self.values.len()
    }
}

impl FragmentBuilder {
    pub fn new() -> FragmentBuilder {
        let mut segments = SmallVec::new();
        segments.push(String::new());
        FragmentBuilder {
            segments,
            values: SmallVec::new(),
        }
    }

    /// Append literal SQL, which may use the `$path` shorthand.
    pub fn text(mut self, text: &str) -> Self {
        self.segments
            .last_mut()
            .expect("Builders always have a segment")
            .push_str(text);
        self
    }

    /// Append a hole, to be filled with `value` at execution time.
    pub fn value(mut self, value: impl Into<Param>) -> Self {
        self.values.push(value.into());
        self.segments.push(String::new());
        self
    }

    /// # Panics
    ///
    /// If the text contains a parameter marker, e.g. `.text("where $x = ?")`.  Holes come only from [Self::value].
    pub fn build(self) -> Fragment {
        Fragment::from_checked_parts(self.segments.iter().map(|x| x.as_str()), self.values)
            .expect("Fragment text may not contain parameter markers")
    }
}

impl Default for FragmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn builder_interleaves() {
        let f = Fragment::builder()
            .text("where $age > ")
            .value(42)
            .text(" and $name = ")
            .value("rey")
            .build();

        assert_eq!(
            f.segments().collect::<Vec<_>>(),
            vec!["where data->>'$.age' > ", " and data->>'$.name' = ", ""]
        );
        assert_eq!(f.values(), &[Param::Integer(42), Param::Text("rey".into())]);
        assert_eq!(f.hole_count(), 2);
    }

    #[test]
    fn adjacent_values_get_empty_segments() {
        let f = Fragment::builder().value(1).value(2).build();
        assert_eq!(f.segments().collect::<Vec<_>>(), vec!["", "", ""]);
    }

    #[test]
    fn new_translates_segments() {
        let f = Fragment::new(&["where $id = ", ""], vec!["yoda".into()]);
        assert_eq!(f, Fragment::builder().text("where $id = ").value("yoda").build());
    }

    #[test]
    #[should_panic(expected = "one more segment than values")]
    fn new_panics_on_mismatch() {
        Fragment::new(&["where $id = "], vec!["yoda".into()]);
    }

    #[test]
    fn try_new_reports_mismatch() {
        let err = Fragment::try_new(&["a", "b", "c"], vec![Param::Null]).unwrap_err();
        assert!(matches!(
            err,
            Error::FragmentArity {
                segments: 3,
                values: 1
            }
        ));
    }

    #[test]
    #[should_panic(expected = "parameter markers")]
    fn build_rejects_markers_in_text() {
        Fragment::builder().text("where $id = ?").build();
    }

    #[test]
    fn markers_only_count_outside_literals() {
        let f = Fragment::raw("where $note = '?' -- why?");
        assert_eq!(f.hole_count(), 0);

        for text in ["where $a = ?", "where $a = :a", "where $a = @a", "where $a = ?1", "where $a = $1"] {
            assert!(
                matches!(
                    Fragment::try_new(&[text], vec![]),
                    Err(Error::ParameterInText(_))
                ),
                "{}",
                text
            );
        }
    }

    #[test]
    fn raw_and_limit() {
        let raw = Fragment::raw("order by $age desc");
        assert_eq!(
            raw.segments().collect::<Vec<_>>(),
            vec!["order by data->>'$.age' desc"]
        );
        assert_eq!(raw.hole_count(), 0);

        let limit = Fragment::limit(3);
        assert_eq!(limit.segments().collect::<Vec<_>>(), vec!["limit ", ""]);
        assert_eq!(limit.values(), &[Param::Integer(3)]);
    }

    proptest! {
        /// Values that look like shorthand must come out untouched, and never end up in the text.
        #[test]
        fn values_stay_out_of_text(values in proptest::collection::vec("\\$[a-z]{1,8}", 0..8)) {
            let mut b = Fragment::builder().text("where");
            for v in values.iter() {
                b = b.text(" $x = ").value(v.as_str());
            }
            let f = b.build();

            prop_assert_eq!(f.segments().count(), values.len() + 1);
            prop_assert_eq!(f.hole_count(), values.len());
            for (got, expected) in f.values().iter().zip(values.iter()) {
                prop_assert_eq!(got, &Param::Text(expected.clone()));
            }
            for s in f.segments() {
                for v in values.iter() {
                    prop_assert!(!s.contains(v.as_str()));
                }
            }
        }
    }
}
