/*!
 * # Editing Controller
 *
 * Owns the focus lifecycle of a document: which block, if any, is shown as
 * an editable raw-text surface, and how that surface flows back into the
 * buffer.
 *
 * ## States
 *
 * - **Unfocused**: every block renders through its semantic renderer
 * - **Focused(id)**: one block is a raw surface seeded with its `content`
 *
 * Moving focus from `a` to `b` commits `a` first, so there is never more
 * than one surface. Blurring commits: the surface text replaces the block's
 * last known span in the buffer and the document is reparsed.
 *
 * ## Structural edits
 *
 * - **Split** (Enter): `before + "\n" + after`, focus lands at the start of
 *   the block after the newline. Code blocks take the newline into the raw
 *   text instead.
 * - **Merge** (Backspace at offset 0): the block and its predecessor become
 *   `predecessor + raw`, cursor on the old boundary.
 *
 * If the reparse leaves no block where focus should land, focus is cleared
 * and a warning is logged.
 */

pub mod active;
pub mod controller;

pub use active::ActiveEdit;
pub use controller::EditingController;
