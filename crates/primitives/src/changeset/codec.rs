//! Packed text form of a changeset.
//!
//! `Z:<old_len><'>' | '<'><len delta><ops>$<char bank>` where every number is
//! base 36 and each op is `(*<code>)*(|<lines>)?<'=' | '+' | '-'><chars>`.

use std::fmt::{self, Write};
use std::str::FromStr;

use super::types::{Op, OpKind};
use super::{Changeset, ChangesetError};
use crate::attrib::{AttribCode, AttribSet};

fn write_base36(out: &mut impl Write, mut n: usize) -> fmt::Result {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
	let mut buf = [0u8; 16];
	let mut idx = buf.len();
	loop {
		idx -= 1;
		buf[idx] = DIGITS[n % 36];
		n /= 36;
		if n == 0 {
			break;
		}
	}
	for &digit in &buf[idx..] {
		out.write_char(digit as char)?;
	}
	Ok(())
}

impl fmt::Display for Changeset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Z:")?;
		write_base36(f, self.old_len)?;
		if self.new_len >= self.old_len {
			f.write_char('>')?;
			write_base36(f, self.new_len - self.old_len)?;
		} else {
			f.write_char('<')?;
			write_base36(f, self.old_len - self.new_len)?;
		}
		for op in &self.ops {
			for code in op.attribs.codes() {
				f.write_char('*')?;
				write_base36(f, code.0 as usize)?;
			}
			if op.lines > 0 {
				f.write_char('|')?;
				write_base36(f, op.lines)?;
			}
			f.write_char(op.kind.symbol())?;
			write_base36(f, op.chars)?;
		}
		f.write_char('$')?;
		f.write_str(&self.char_bank)
	}
}

struct Cursor<'a> {
	src: &'a str,
	pos: usize,
}

impl Cursor<'_> {
	fn peek(&self) -> Option<char> {
		self.src[self.pos..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.pos += ch.len_utf8();
		Some(ch)
	}

	fn number(&mut self) -> Result<usize, ChangesetError> {
		let rest = &self.src[self.pos..];
		let len = rest
			.find(|c: char| !(c.is_ascii_digit() || c.is_ascii_lowercase()))
			.unwrap_or(rest.len());
		if len == 0 {
			return Err(malformed(format!("expected a number at byte {}", self.pos)));
		}
		let n = usize::from_str_radix(&rest[..len], 36)
			.map_err(|e| malformed(format!("bad number at byte {}: {e}", self.pos)))?;
		self.pos += len;
		Ok(n)
	}
}

fn malformed(msg: impl Into<String>) -> ChangesetError {
	ChangesetError::Malformed(msg.into())
}

impl FromStr for Changeset {
	type Err = ChangesetError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let body = s
			.strip_prefix("Z:")
			.ok_or_else(|| malformed("missing Z: header"))?;
		let mut cur = Cursor { src: body, pos: 0 };

		let old_len = cur.number()?;
		let new_len = match cur.bump() {
			Some('>') => old_len
				.checked_add(cur.number()?)
				.ok_or_else(|| malformed("length delta overflows"))?,
			Some('<') => old_len
				.checked_sub(cur.number()?)
				.ok_or_else(|| malformed("length delta shrinks below zero"))?,
			_ => return Err(malformed("missing length delta")),
		};

		let mut ops = Vec::new();
		let mut codes = Vec::new();
		let mut lines = 0;
		loop {
			match cur.bump() {
				Some('*') => {
					let code = u32::try_from(cur.number()?)
						.map_err(|_| malformed(format!("attribute code out of range at byte {}", cur.pos)))?;
					codes.push(AttribCode(code));
				}
				Some('|') => lines = cur.number()?,
				Some('$') => break,
				Some(ch) => {
					let kind = OpKind::from_symbol(ch)
						.ok_or_else(|| malformed(format!("unexpected {ch:?} in ops")))?;
					let chars = cur.number()?;
					let attribs = AttribSet::from_codes(codes.drain(..));
					ops.push(Op::new(kind, chars, std::mem::take(&mut lines), attribs));
				}
				None => return Err(malformed("missing $ char bank marker")),
			}
		}
		if !codes.is_empty() || lines != 0 {
			return Err(malformed("dangling op prefix before $"));
		}
		let char_bank = body[cur.pos..].to_string();

		let cs = Changeset {
			old_len,
			new_len,
			ops,
			char_bank,
		};
		cs.check_lengths()?;
		Ok(cs)
	}
}

impl Changeset {
	/// Checks that op lengths agree with the header and the char bank.
	pub(crate) fn check_lengths(&self) -> Result<(), ChangesetError> {
		let overflow = || malformed("op lengths overflow");
		let consumed = self.checked_consumed().ok_or_else(overflow)?;
		if consumed > self.old_len {
			return Err(ChangesetError::PastEnd {
				offset: 0,
				chars: consumed,
				len: self.old_len,
			});
		}
		let (inserted, removed) = self
			.ops
			.iter()
			.try_fold((0usize, 0usize), |(ins, rem), op| match op.kind {
				OpKind::Insert => Some((ins.checked_add(op.chars)?, rem)),
				OpKind::Remove => Some((ins, rem.checked_add(op.chars)?)),
				OpKind::Keep => Some((ins, rem)),
			})
			.ok_or_else(overflow)?;
		let produced = (self.old_len - removed).checked_add(inserted).ok_or_else(overflow)?;
		if produced != self.new_len {
			return Err(malformed(format!(
				"ops produce {produced} chars, header declares {}",
				self.new_len
			)));
		}
		if self.char_bank.chars().count() != inserted {
			return Err(malformed("char bank length disagrees with insert ops"));
		}
		Ok(())
	}
}
