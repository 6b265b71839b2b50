mod catalog_vm;
mod dialogue_vm;

pub use catalog_vm::{CatalogCardVm, CatalogVm, RunBadge, map_catalog, map_catalog_card};
pub use dialogue_vm::{
    DialogueIntent, DialogueScreenVm, DialoguePhase, DialogueVm, FeedbackVm, OptionMark, OptionVm,
    start_dialogue,
};
