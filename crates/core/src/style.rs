//! Style spans to attribute changesets.

use tandem_primitives::{Changeset, ChangesetBuilder, StyleSpan};

use crate::error::{Error, Result};
use crate::pad::Pad;

/// Builds a keep-with-attributes changeset laying `spans` over the pad text.
///
/// Spans must cover the text exactly and each span's line count must match
/// the text under it. Both are checked before any attribute is registered, so
/// a rejected input leaves the pool untouched. An empty span list yields an
/// identity changeset.
pub fn build_style_changeset(pad: &mut Pad, spans: &[StyleSpan]) -> Result<Changeset> {
	let len = pad.len_chars();
	if spans.is_empty() {
		return Ok(Changeset::identity(len));
	}

	let total = spans
		.iter()
		.fold(0usize, |acc, span| acc.saturating_add(span.chars));
	if total != len {
		return Err(Error::SpanLengthMismatch {
			key: pad.key().clone(),
			expected: len,
			actual: total,
		});
	}

	let mut offset = 0;
	for span in spans {
		let actual = pad.content().newlines_in(offset, span.chars);
		if actual != span.lines {
			return Err(Error::SpanLineMismatch {
				key: pad.key().clone(),
				offset,
				declared: span.lines,
				actual,
			});
		}
		offset += span.chars;
	}

	let mut builder = ChangesetBuilder::new(len);
	for span in spans {
		builder.keep(span.chars, span.lines, &span.attributes, pad.pool_mut());
	}
	Ok(builder.finish()?)
}

#[cfg(test)]
mod tests {
	use tandem_primitives::{Attribute, PadKey};

	use super::*;

	fn pad(text: &str) -> Pad {
		let mut pad = Pad::placeholder(PadKey::resolve(&"u".into(), &"/A.java".into()));
		pad.install(text);
		pad
	}

	fn kw() -> Vec<Attribute> {
		vec![Attribute::new("style", "keyword")]
	}

	#[test]
	fn test_spans_become_keep_ops() {
		let mut pad = pad("int x;\n");
		let spans = [StyleSpan::new(3, 0, kw()), StyleSpan::plain(4, 1)];
		let cs = build_style_changeset(&mut pad, &spans).unwrap();
		assert_eq!(cs.ops().len(), 2);
		assert_eq!(cs.new_len(), 7);
		assert_eq!(pad.pool().len(), 1);
	}

	#[test]
	fn test_length_mismatch_leaves_pool_untouched() {
		let mut pad = pad("int x;");
		let spans = [StyleSpan::new(3, 0, kw()), StyleSpan::new(5, 0, kw())];
		let err = build_style_changeset(&mut pad, &spans).unwrap_err();
		assert!(matches!(err, Error::SpanLengthMismatch { expected: 6, actual: 8, .. }));
		assert!(pad.pool().is_empty());
	}

	#[test]
	fn test_line_mismatch_leaves_pool_untouched() {
		let mut pad = pad("a\nb");
		let spans = [StyleSpan::new(3, 0, kw())];
		assert!(matches!(
			build_style_changeset(&mut pad, &spans),
			Err(Error::SpanLineMismatch { offset: 0, declared: 0, actual: 1, .. })
		));
		assert!(pad.pool().is_empty());
	}

	#[test]
	fn test_overflowing_span_lengths_are_rejected() {
		let mut pad = pad("abc");
		let spans = [StyleSpan::new(usize::MAX, 0, kw()), StyleSpan::new(1, 0, kw())];
		let err = build_style_changeset(&mut pad, &spans).unwrap_err();
		assert!(matches!(err, Error::SpanLengthMismatch { expected: 3, actual: usize::MAX, .. }));
		assert!(pad.pool().is_empty());
	}

	#[test]
	fn test_empty_spans_are_identity() {
		let mut pad = pad("abc");
		let cs = build_style_changeset(&mut pad, &[]).unwrap();
		assert!(cs.is_identity());
		assert_eq!(cs.old_len(), 3);
	}
}
