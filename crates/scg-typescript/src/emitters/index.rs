//! Emits the `index.ts` barrel re-exporting the types and client modules.

pub fn emit_index() -> String {
    include_str!("../../templates/index.ts.j2").to_string()
}
