use std::collections::btree_map::{BTreeMap, Entry};

use crate::definition::SettingsDefinition;
use crate::error::{Result, SchemaError};
use crate::types::{FieldWidth, Qsid};

/// Flattened QSID → width lookup derived from a settings definition.
///
/// Iterates in ascending QSID order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaProjection {
    widths: BTreeMap<Qsid, FieldWidth>,
}

impl SchemaProjection {
    /// Flatten a definition.
    ///
    /// Fields sharing a QSID must agree on its width.
    pub fn from_definition(definition: &SettingsDefinition) -> Result<Self> {
        let mut widths = BTreeMap::new();

        for tab in &definition.tabs {
            for field in &tab.fields {
                let qsid = u16::try_from(field.qsid)
                    .ok()
                    .and_then(Qsid::new)
                    .ok_or_else(|| SchemaError::InvalidQsid {
                        tab: tab.name.clone(),
                        qsid: field.qsid,
                    })?;
                let width = FieldWidth::from_declared(field.width).ok_or(
                    SchemaError::InvalidWidth {
                        qsid: qsid.get(),
                        width: field.width.unwrap_or_default(),
                    },
                )?;

                match widths.entry(qsid) {
                    Entry::Vacant(slot) => {
                        slot.insert(width);
                    }
                    Entry::Occupied(existing) if *existing.get() != width => {
                        return Err(SchemaError::ConflictingWidth {
                            qsid: qsid.get(),
                            first: *existing.get() as u8,
                            second: width as u8,
                        });
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }

        Ok(Self { widths })
    }

    /// Width of `qsid`, if the definition knows it.
    pub fn width(&self, qsid: Qsid) -> Option<FieldWidth> {
        self.widths.get(&qsid).copied()
    }

    /// True if the definition knows `qsid`.
    pub fn contains(&self, qsid: Qsid) -> bool {
        self.widths.contains_key(&qsid)
    }

    /// All known QSIDs with their widths, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (Qsid, FieldWidth)> + '_ {
        self.widths.iter().map(|(qsid, width)| (*qsid, *width))
    }

    /// Number of distinct QSIDs.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

impl FromIterator<(Qsid, FieldWidth)> for SchemaProjection {
    fn from_iter<I: IntoIterator<Item = (Qsid, FieldWidth)>>(iter: I) -> Self {
        Self {
            widths: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Field, Tab};

    fn qsid(raw: u16) -> Qsid {
        Qsid::new(raw).unwrap()
    }

    fn definition(fields: Vec<Field>) -> SettingsDefinition {
        SettingsDefinition {
            tabs: vec![Tab {
                name: "Test".to_string(),
                fields,
            }],
        }
    }

    #[test]
    fn flattens_tabs_and_defaults_to_byte() {
        let def = SettingsDefinition {
            tabs: vec![
                Tab {
                    name: "A".to_string(),
                    fields: vec![Field::new(3, None), Field::new(1, Some(2))],
                },
                Tab {
                    name: "B".to_string(),
                    fields: vec![Field::new(2, Some(4))],
                },
            ],
        };
        let projection = def.projection().unwrap();

        assert_eq!(projection.len(), 3);
        assert_eq!(projection.width(qsid(1)), Some(FieldWidth::Short));
        assert_eq!(projection.width(qsid(2)), Some(FieldWidth::Long));
        assert_eq!(projection.width(qsid(3)), Some(FieldWidth::Byte));
        assert!(!projection.contains(qsid(4)));

        let order: Vec<u16> = projection.iter().map(|(q, _)| q.get()).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn shared_bitfield_qsid_collapses() {
        let mut first = Field::new(1, None);
        first.bit = Some(0);
        let mut second = Field::new(1, Some(1));
        second.bit = Some(1);

        let projection = definition(vec![first, second]).projection().unwrap();
        assert_eq!(projection.len(), 1);
        assert_eq!(projection.width(qsid(1)), Some(FieldWidth::Byte));
    }

    #[test]
    fn conflicting_width_rejected() {
        let err = definition(vec![Field::new(5, Some(2)), Field::new(5, Some(4))])
            .projection()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ConflictingWidth {
                qsid: 5,
                first: 2,
                second: 4
            }
        ));
    }

    #[test]
    fn out_of_range_qsid_rejected() {
        for raw in [0, 0xFFFF, 70_000] {
            let err = definition(vec![Field::new(raw, None)])
                .projection()
                .unwrap_err();
            assert!(matches!(err, SchemaError::InvalidQsid { qsid, .. } if qsid == raw));
        }
    }
}
