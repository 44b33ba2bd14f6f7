use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        tables::{FieldRvaRaw, MetadataEntity, TableId},
        token::Token,
    },
    Result,
};

/// The location of a field's initial data.
pub struct FieldRva {
    token: Token,
    rva: u32,
    field: u32,
    raw: FieldRvaRaw,
    dirty: bool,
}

impl FieldRva {
    pub(crate) fn new(rva: u32, field: u32) -> Self {
        FieldRva {
            token: Token::default(),
            rva,
            field,
            raw: FieldRvaRaw::default(),
            dirty: true,
        }
    }

    /// The RVA of the data
    #[must_use]
    pub fn rva(&self) -> u32 {
        self.rva
    }

    /// Move the data
    pub fn set_rva(&mut self, rva: u32) {
        self.rva = rva;
        self.dirty = true;
    }

    /// Row of the field in the `Field` table
    #[must_use]
    pub fn field(&self) -> u32 {
        self.field
    }

    /// Token of the field this data belongs to
    #[must_use]
    pub fn field_token(&self) -> Token {
        Token::from_parts(TableId::Field, self.field)
    }
}

impl MetadataEntity for FieldRva {
    type Raw = FieldRvaRaw;
    const TABLE_ID: TableId = TableId::FieldRVA;

    fn from_raw(raw: FieldRvaRaw, context: &ReadingContext) -> Result<Self> {
        context.check_row(TableId::Field, raw.field)?;

        Ok(FieldRva {
            token: raw.token,
            rva: raw.rva,
            field: raw.field,
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, _context: &mut BuildingContext) -> Result<()> {
        self.raw = FieldRvaRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            rva: self.rva,
            field: self.field,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &FieldRvaRaw {
        &self.raw
    }

    fn token(&self) -> Token {
        self.token
    }

    fn assign_token(&mut self, token: Token) {
        if self.token != token {
            self.token = token;
            self.dirty = true;
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories::{heaps, reading_context};

    #[test]
    fn field_index_is_validated() {
        let context = reading_context(heaps(b"\0", &[0x00]), &[(TableId::Field, 2)]);
        let raw = FieldRvaRaw {
            rid: 1,
            token: Token::from_parts(TableId::FieldRVA, 1),
            rva: 0x2050,
            field: 2,
            ..FieldRvaRaw::default()
        };
        let rva = FieldRva::from_raw(raw.clone(), &context).unwrap();
        assert_eq!(rva.rva(), 0x2050);
        assert_eq!(rva.field_token(), Token::from_parts(TableId::Field, 2));

        let dangling = FieldRvaRaw { field: 3, ..raw };
        assert!(FieldRva::from_raw(dangling, &context).is_err());
    }

    #[test]
    fn update_copies_scalars() {
        let mut rva = FieldRva::new(0x4000, 1);
        rva.assign_token(Token::from_parts(TableId::FieldRVA, 1));
        rva.set_rva(0x4010);
        assert!(rva.is_dirty());

        let mut context = BuildingContext::new(heaps(b"\0", &[0x00]), Default::default());
        rva.update_raw(&mut context).unwrap();
        assert!(!rva.is_dirty());
        assert_eq!(rva.raw().rva, 0x4010);
        assert_eq!(rva.raw().rid, 1);
    }
}
