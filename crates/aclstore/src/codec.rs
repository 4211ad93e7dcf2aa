//! Byte encoding of ACL membership.
//!
//! An ACL is persisted as its members joined by [`SEPARATOR`], in canonical
//! form: sorted ascending with duplicates removed. Two ACLs with the same
//! members therefore always persist to identical bytes. An ACL with no
//! members is a present, empty value.

use std::borrow::Cow;

use crate::{Error, Result};

/// Separator between members in the persisted value. Not allowed in user names.
pub const SEPARATOR: char = '\n';

/// Returns `true` if `user` may be stored in an ACL.
pub fn is_valid_user(user: &str) -> bool {
    !user.is_empty() && !user.contains(SEPARATOR)
}

/// Sort and deduplicate `members`.
///
/// Input that is already strictly ascending is returned as-is without
/// allocating; that is the common case for membership read back from the
/// store.
pub fn canonicalize(members: &[String]) -> Cow<'_, [String]> {
    if members.windows(2).all(|w| w[0] < w[1]) {
        return Cow::Borrowed(members);
    }
    let mut sorted = members.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Cow::Owned(sorted)
}

/// Encode `members` in canonical form, rejecting invalid user names.
pub fn encode(members: &[String]) -> Result<Vec<u8>> {
    let members = canonicalize(members);
    if let Some(bad) = members.iter().find(|u| !is_valid_user(u)) {
        return Err(Error::BadUsername { user: bad.clone() });
    }
    let size = members.iter().map(|u| u.len() + 1).sum::<usize>();
    let mut out = Vec::with_capacity(size);
    for (i, user) in members.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR as u8);
        }
        out.extend_from_slice(user.as_bytes());
    }
    Ok(out)
}

/// Decode the persisted value of ACL `name`.
pub fn decode(name: &str, value: &[u8]) -> Result<Vec<String>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    let text = std::str::from_utf8(value).map_err(|_| Error::CorruptEntry {
        name: name.to_string(),
    })?;
    Ok(text.split(SEPARATOR).map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn users(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonicalize_sorted_input_borrows() {
        let input = users(&["a", "b", "c"]);
        assert!(matches!(canonicalize(&input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_canonicalize_duplicates_need_work() {
        let input = users(&["a", "a", "b"]);
        let out = canonicalize(&input);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(&*out, users(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_canonicalize_unsorted() {
        let input = users(&["e", "a", "d", "f", "e", "a", "c"]);
        assert_eq!(&*canonicalize(&input), users(&["a", "c", "d", "e", "f"]).as_slice());
    }

    #[test]
    fn test_encode_joins_with_separator() {
        let value = encode(&users(&["bob", "alice"])).unwrap();
        assert_eq!(value, b"alice\nbob");
    }

    #[test]
    fn test_encode_empty_is_empty_value() {
        assert_eq!(encode(&[]).unwrap(), Vec::<u8>::new());
        assert_eq!(decode("x", b"").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_encode_rejects_empty_user() {
        let err = encode(&users(&["daisy", ""])).unwrap_err();
        assert!(matches!(err, Error::BadUsername { ref user } if user.is_empty()));
    }

    #[test]
    fn test_encode_rejects_separator_in_user() {
        let err = encode(&users(&["a\nb"])).unwrap_err();
        assert!(matches!(err, Error::BadUsername { ref user } if user == "a\nb"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode("broken", &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { ref name } if name == "broken"));
    }

    proptest! {
        #[test]
        fn prop_canonical_form_is_sorted_and_unique(
            members in proptest::collection::vec("[a-z0-9@._-]{1,6}", 0..24)
        ) {
            let decoded = decode("p", &encode(&members).unwrap()).unwrap();
            let mut expected = members.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(decoded, expected);
        }

        #[test]
        fn prop_equal_sets_encode_identically(
            members in proptest::collection::vec("[a-z]{1,4}", 0..16)
        ) {
            let mut reversed = members.clone();
            reversed.reverse();
            reversed.extend(members.iter().cloned());
            prop_assert_eq!(encode(&members).unwrap(), encode(&reversed).unwrap());
        }
    }
}
