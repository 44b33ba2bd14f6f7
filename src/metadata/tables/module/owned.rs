use std::sync::Arc;

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        streams::Heaps,
        tables::{LazyValue, MetadataEntity, ModuleRaw, TableId},
        token::Token,
    },
    Error, Result,
};

/// The module definition.
pub struct Module {
    token: Token,
    generation: u32,
    name: LazyValue<String>,
    mvid: LazyValue<Option<uguid::Guid>>,
    encid: LazyValue<Option<uguid::Guid>>,
    encbaseid: LazyValue<Option<uguid::Guid>>,
    heaps: Option<Arc<Heaps>>,
    raw: ModuleRaw,
    dirty: bool,
}

impl Module {
    pub(crate) fn new(name: String, mvid: uguid::Guid) -> Self {
        Module {
            token: Token::default(),
            generation: 0,
            name: LazyValue::resolved(name),
            mvid: LazyValue::resolved(Some(mvid)),
            encid: LazyValue::resolved(None),
            encbaseid: LazyValue::resolved(None),
            heaps: None,
            raw: ModuleRaw::default(),
            dirty: true,
        }
    }

    fn heaps(&self) -> Result<&Heaps> {
        self.heaps.as_deref().ok_or(Error::Detached(self.token))
    }

    fn resolve_guid(&self, index: u32) -> Result<Option<uguid::Guid>> {
        if index == 0 {
            return Ok(None);
        }
        Ok(Some(self.heaps()?.guid.get(index as usize)?))
    }

    /// Reserved, zero
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The module name, usually the file name
    ///
    /// # Errors
    /// Returns an error if the name cannot be read from `#Strings`.
    pub fn name(&self) -> Result<&str> {
        self.name
            .get_or_resolve(|offset| Ok(self.heaps()?.strings.get(offset as usize)?.to_string()))
            .map(String::as_str)
    }

    /// Rename the module
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
        self.dirty = true;
    }

    /// The module version id.
    ///
    /// # Errors
    /// Returns an error if the `#GUID` index is out of range.
    pub fn mvid(&self) -> Result<Option<uguid::Guid>> {
        self.mvid
            .get_or_resolve(|index| self.resolve_guid(index))
            .copied()
    }

    /// Replace the module version id
    pub fn set_mvid(&mut self, mvid: Option<uguid::Guid>) {
        self.mvid.set(mvid);
        self.dirty = true;
    }

    /// The edit-and-continue id
    ///
    /// # Errors
    /// Returns an error if the `#GUID` index is out of range.
    pub fn encid(&self) -> Result<Option<uguid::Guid>> {
        self.encid
            .get_or_resolve(|index| self.resolve_guid(index))
            .copied()
    }

    /// The edit-and-continue base id
    ///
    /// # Errors
    /// Returns an error if the `#GUID` index is out of range.
    pub fn encbaseid(&self) -> Result<Option<uguid::Guid>> {
        self.encbaseid
            .get_or_resolve(|index| self.resolve_guid(index))
            .copied()
    }
}

impl MetadataEntity for Module {
    type Raw = ModuleRaw;
    const TABLE_ID: TableId = TableId::Module;

    fn from_raw(raw: ModuleRaw, context: &ReadingContext) -> Result<Self> {
        context.check_string(raw.name)?;
        context.check_guid(raw.mvid)?;
        context.check_guid(raw.encid)?;
        context.check_guid(raw.encbaseid)?;

        Ok(Module {
            token: raw.token,
            generation: raw.generation,
            name: LazyValue::unresolved(raw.name),
            mvid: LazyValue::unresolved(raw.mvid),
            encid: LazyValue::unresolved(raw.encid),
            encbaseid: LazyValue::unresolved(raw.encbaseid),
            heaps: Some(context.heaps().clone()),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let name = match context.reusable(self.name.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_string(self.name()?)?,
        };

        let mut guids = [0u32; 3];
        for (slot, value) in guids
            .iter_mut()
            .zip([&self.mvid, &self.encid, &self.encbaseid])
        {
            *slot = match context.reusable(value.source(), self.heaps.as_ref()) {
                Some(index) => index,
                None => match value.get_or_resolve(|index| self.resolve_guid(index))? {
                    Some(guid) => context.intern_guid(guid)?,
                    None => 0,
                },
            };
        }

        self.raw = ModuleRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            generation: self.generation,
            name,
            mvid: guids[0],
            encid: guids[1],
            encbaseid: guids[2],
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &ModuleRaw {
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

    fn resolve_all(&self) -> Result<()> {
        self.name()?;
        self.mvid()?;
        self.encid()?;
        self.encbaseid()?;
        Ok(())
    }
}
