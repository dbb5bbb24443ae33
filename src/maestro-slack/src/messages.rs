//! Slack response types and spell result formatting.
//!
//! Spell attributes are rendered as legacy message attachments: each
//! attachment is one row of the result grid and each attachment field one
//! column. Slack puts at most two short fields side by side on narrow
//! clients, but keeps up to [`MAX_CELLS_PER_ROW`] together on desktop.

use serde::{Deserialize, Serialize};

use crate::error::ActionResult;
use crate::record::{FieldRecord, SpellField, SpellSheet};

/// Maximum number of cells in one grid row.
pub const MAX_CELLS_PER_ROW: usize = 4;

/// Response type for slash command responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only visible to the user who invoked the command.
    Ephemeral,
    /// Visible to everyone in the channel.
    #[default]
    InChannel,
}

/// A single labelled value inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Legacy message attachment; one per grid row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub fields: Vec<AttachmentField>,
}

/// Immediate response to a slash command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommandResponse {
    /// Message text.
    pub text: String,
    /// Response type (ephemeral or in_channel).
    pub response_type: ResponseType,
    /// Attachment rows.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl SlashCommandResponse {
    /// Create a simple text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set response type to in_channel (visible to all).
    pub fn in_channel(mut self) -> Self {
        self.response_type = ResponseType::InChannel;
        self
    }

    /// Set the attachment rows.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Serialize to the JSON body Slack expects.
    pub fn to_json(&self) -> ActionResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How the fields of a record are placed into rows.
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// Explicit rows; each inner slice is one row.
    Rows(&'static [&'static [SpellField]]),
    /// A flat order packed left to right into full rows.
    Packed(&'static [SpellField]),
}

/// One cell of the result grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub title: &'static str,
    pub value: String,
    pub short: bool,
}

/// Rows of cells, built once from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultGrid {
    rows: Vec<Vec<GridCell>>,
}

impl ResultGrid {
    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.rows
    }

    /// Convert to attachments, one per row.
    pub fn into_attachments(self) -> Vec<Attachment> {
        self.rows
            .into_iter()
            .map(|row| Attachment {
                fields: row
                    .into_iter()
                    .map(|cell| AttachmentField {
                        title: cell.title.to_string(),
                        value: cell.value,
                        short: cell.short,
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Place the fields of `record` according to `layout`.
///
/// Fields named by the layout but absent from the record are skipped; fields
/// in the record the layout does not name are not shown.
pub fn format_grid(record: &FieldRecord, layout: &Layout) -> ResultGrid {
    let mut rows = Vec::new();
    match layout {
        Layout::Rows(table) => {
            for row in table.iter() {
                pack_row(record, row, &mut rows);
            }
        }
        Layout::Packed(order) => pack_row(record, order, &mut rows),
    }
    ResultGrid { rows }
}

fn pack_row(record: &FieldRecord, fields: &[SpellField], rows: &mut Vec<Vec<GridCell>>) {
    let cells: Vec<GridCell> = fields
        .iter()
        .filter_map(|&field| {
            record.get(field).map(|value| GridCell {
                title: field.title(),
                value: value.to_string(),
                short: field.is_short(),
            })
        })
        .collect();

    rows.extend(
        cells
            .chunks(MAX_CELLS_PER_ROW)
            .map(<[GridCell]>::to_vec),
    );
}

/// Build the channel response for a resolved spell.
pub fn format_spell_response(sheet: SpellSheet, layout: &Layout) -> SlashCommandResponse {
    let grid = format_grid(&sheet.record, layout);
    SlashCommandResponse::text(sheet.headline)
        .in_channel()
        .with_attachments(grid.into_attachments())
}
