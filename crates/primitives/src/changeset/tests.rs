use proptest::prelude::*;

use super::{Changeset, ChangesetBuilder, ChangesetError, OpKind};
use crate::{AttribCode, AttributePool, AttributedText, Attribute};

#[test]
fn test_builder_lengths() {
	let mut pool = AttributePool::new();
	let mut b = ChangesetBuilder::new(10);
	b.retain(4, 0).remove(3, 0).insert("ab", &[], &mut pool);
	assert_eq!(b.consumed(), 7);
	let cs = b.finish().unwrap();
	assert_eq!(cs.old_len(), 10);
	assert_eq!(cs.new_len(), 9);
	assert_eq!(cs.char_bank(), "ab");
	assert_eq!(cs.consumed(), 7);
}

#[test]
fn test_builder_skips_empty_ops_without_interning() {
	let mut pool = AttributePool::new();
	let mut b = ChangesetBuilder::new(3);
	b.keep(0, 0, &[Attribute::new("style", "keyword")], &mut pool)
		.insert("", &[Attribute::new("author", "a")], &mut pool)
		.retain(3, 0);
	let cs = b.finish().unwrap();
	assert_eq!(cs.ops().len(), 1);
	assert!(pool.is_empty());
	assert!(cs.is_identity());
}

#[test]
fn test_builder_rejects_past_end() {
	let mut b = ChangesetBuilder::new(2);
	b.retain(3, 0);
	assert!(matches!(b.finish(), Err(ChangesetError::PastEnd { chars: 3, len: 2, .. })));
}

#[test]
fn test_builder_does_not_merge_adjacent_ops() {
	let mut pool = AttributePool::new();
	let mut b = ChangesetBuilder::new(4);
	b.keep(2, 0, &[], &mut pool).keep(2, 0, &[], &mut pool);
	assert_eq!(b.finish().unwrap().ops().len(), 2);
}

#[test]
fn test_packed_form() {
	let mut pool = AttributePool::new();
	pool.put(&Attribute::new("author", "a"));
	let mut b = ChangesetBuilder::new(40);
	b.keep(37, 2, &[Attribute::new("style", "keyword")], &mut pool)
		.remove(1, 0)
		.insert("xy\n", &[Attribute::new("author", "a")], &mut pool);
	let cs = b.finish().unwrap();

	let packed = cs.to_string();
	assert_eq!(packed, "Z:14>2*1|2=11-1*0|1+3$xy\n");

	let parsed: Changeset = packed.parse().unwrap();
	assert_eq!(parsed, cs);
	assert_eq!(parsed.ops()[0].kind, OpKind::Keep);
	assert!(parsed.ops()[0].attribs.contains(AttribCode(1)));
}

#[test]
fn test_parse_shrinking_delta() {
	let cs: Changeset = "Z:5<2=1-2$".parse().unwrap();
	assert_eq!(cs.old_len(), 5);
	assert_eq!(cs.new_len(), 3);
}

#[test]
fn test_parse_rejects_malformed() {
	for bad in [
		"",
		"Z:",
		"5>0$",
		"Z:5",
		"Z:5>0=5",
		"Z:5>0*0$",
		"Z:5>0?5$",
		"Z:5>1+1$",
		"Z:5>0=6$",
		"Z:2<3$",
	] {
		assert!(bad.parse::<Changeset>().is_err(), "accepted {bad:?}");
	}
}

#[test]
fn test_parse_rejects_overflowing_lengths() {
	let huge = "3w5e11264sgsf";
	for bad in [
		format!("Z:{huge}>1$"),
		format!("Z:1>0={huge}=2$"),
		format!("Z:{huge}>0={huge}=1$"),
		format!("Z:1>0+{huge}+2$ab"),
		format!("Z:{huge}<0-{huge}-1$"),
		"Z:1>0*1z141z4=1$".to_string(),
	] {
		assert!(
			matches!(bad.parse::<Changeset>(), Err(ChangesetError::Malformed(_))),
			"accepted {bad:?}"
		);
	}
}

#[test]
fn test_packed_form_round_trips_builder_output() {
	let mut pool = AttributePool::new();
	let mut doc = AttributedText::new("fn main() {\n\tlet x = 1;\n}\n");
	let len = doc.len_chars();
	let mut b = ChangesetBuilder::new(len);
	b.keep(2, 0, &[Attribute::new("style", "keyword")], &mut pool)
		.keep(10, 1, &[Attribute::new("style", "plain"), Attribute::new("bold", "true")], &mut pool)
		.remove(4, 0)
		.insert("const", &[Attribute::new("author", "alice")], &mut pool)
		.insert("\n\n", &[], &mut pool)
		.keep(9, 1, &[Attribute::new("style", "")], &mut pool);
	let cs = b.finish().unwrap();

	let parsed: Changeset = cs.to_string().parse().unwrap();
	assert_eq!(parsed, cs);
	assert_eq!(parsed.to_string(), cs.to_string());

	doc.apply(&parsed, &pool).unwrap();
	assert_eq!(doc.text().to_string(), "fn main() {\nconst\n\n x = 1;\n}\n");
}

#[test]
fn test_apply_parsed_changeset() {
	let mut pool = AttributePool::new();
	pool.put(&Attribute::new("style", "comment"));
	let mut doc = AttributedText::new("// hi\nx");
	let cs: Changeset = "Z:7>0*0|1=6$".parse().unwrap();
	doc.apply(&cs, &pool).unwrap();
	assert!(doc.attribs_at(0).unwrap().contains(AttribCode(0)));
	assert!(doc.attribs_at(6).unwrap().is_empty());
}

proptest! {
	#[test]
	fn prop_builder_new_len_matches_applied_text(
		text in "[a-z\n]{0,40}",
		keep in 0usize..40,
		del in 0usize..40,
		ins in "[a-z\n]{0,10}",
	) {
		let mut pool = AttributePool::new();
		let mut doc = AttributedText::new(&text);
		let len = doc.len_chars();
		let keep = keep.min(len);
		let del = del.min(len - keep);
		let keep_lines = doc.newlines_in(0, keep);
		let del_lines = doc.newlines_in(keep, del);

		let mut b = ChangesetBuilder::new(len);
		b.retain(keep, keep_lines).remove(del, del_lines).insert(&ins, &[], &mut pool);
		let cs = b.finish().unwrap();
		doc.apply(&cs, &pool).unwrap();

		prop_assert_eq!(doc.len_chars(), cs.new_len());
		let mut expected: String = text.chars().take(keep).collect();
		expected.push_str(&ins);
		expected.extend(text.chars().skip(keep + del));
		prop_assert_eq!(doc.text().to_string(), expected);
	}
}
