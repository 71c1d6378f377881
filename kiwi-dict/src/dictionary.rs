//! Owns the parsed morpheme table, indexable by id or by surface form.

use std::collections::HashMap;

use crate::morpheme::{Form, MorphemeEntry, MorphemeId};

/// The mutable morpheme/form table a `KiwiBuilder`-equivalent accumulates
/// before compiling a trie over it.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    entries: Vec<MorphemeEntry>,
    forms: HashMap<Vec<u16>, MorphemeId>,
    form_list: Vec<Form>,
}

impl Dictionary {
    /// An empty dictionary.
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    /// Insert a morpheme entry, attaching it to its form's entry list
    /// (creating the form if this is the first entry for that surface
    /// string). Returns the new entry's id.
    pub fn insert(&mut self, entry: MorphemeEntry) -> MorphemeId {
        let id = self.entries.len() as MorphemeId;
        let key = entry.form_jamo.clone();
        self.entries.push(entry);

        match self.forms.get(&key) {
            Some(&form_id) => {
                self.form_list[form_id as usize].morphemes.push(id);
            }
            None => {
                let form_id = self.form_list.len() as MorphemeId;
                let mut form = Form::new(key.clone());
                form.morphemes.push(id);
                self.form_list.push(form);
                self.forms.insert(key, form_id);
            }
        }
        id
    }

    /// Look up an entry by id.
    pub fn entry(&self, id: MorphemeId) -> Option<&MorphemeEntry> {
        self.entries.get(id as usize)
    }

    /// Look up the form record for a jamo surface string.
    pub fn form(&self, form_jamo: &[u16]) -> Option<&Form> {
        self.forms.get(form_jamo).map(|&id| &self.form_list[id as usize])
    }

    /// Every form in the dictionary, in insertion order. Used by
    /// `kiwi-automata` to build the trie.
    pub fn forms(&self) -> &[Form] {
        &self.form_list
    }

    /// Every morpheme entry, in insertion (id) order.
    pub fn entries(&self) -> &[MorphemeEntry] {
        &self.entries
    }

    /// Number of distinct forms.
    pub fn form_count(&self) -> usize {
        self.form_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{PosTag, Tag};

    #[test]
    fn shares_form_across_homograph_entries() {
        let mut dict = Dictionary::new();
        let form = vec![0x1100, 0x1161];
        dict.insert(MorphemeEntry::plain(form.clone(), Tag::new(PosTag::NNG), -2.0));
        dict.insert(MorphemeEntry::plain(form.clone(), Tag::new(PosTag::VV), -3.0));
        assert_eq!(dict.form_count(), 1);
        assert_eq!(dict.form(&form).unwrap().morphemes.len(), 2);
    }
}
