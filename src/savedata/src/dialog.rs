//! The save/load/delete utility dialog.
//!
//! Driven once per frame by `update`.  Input is edge-triggered: a button
//! counts as pressed on the frame it goes down, compared against the mask
//! seen at the end of the previous running frame.  Modes that show nothing
//! (direct load/save, sizes, list, delete) are carried out on the first
//! running frame and finish immediately.

use log::{debug, error};
use metafs::MetaFileSystem;
use sysdefs::constants::{
    DialogStatus, SavedataMode, SceError, CTRL_CIRCLE, CTRL_CROSS, CTRL_DOWN, CTRL_LEFT, CTRL_RIGHT,
    CTRL_UP, SCE_UTILITY_DIALOG_RESULT_CANCEL, SCE_UTILITY_DIALOG_RESULT_SUCCESS,
};
use typemap::guest_memory::GuestMemory;

use crate::ctrl::ButtonSource;
use crate::param::SavedataManager;
use crate::ppge::{AtlasImage, PpgeDraw, PPGE_ALIGN_LEFT};

const TEXT_SCALE: f32 = 0.5;
const COLOR_WHITE: u32 = 0xFFFF_FFFF;
const COLOR_HIGHLIGHT: u32 = 0xFF00_00FF;
const COLOR_SLOT_USED: u32 = 0xFF00_0000;
const COLOR_SLOT_EMPTY: u32 = 0xFF77_7777;

/// What the dialog is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    /// Nothing on screen; the request is handled without user input.
    #[default]
    Idle,
    SaveListChoice,
    ConfirmOverwrite,
    Saving,
    SaveDone,
    LoadListChoice,
    Loading,
    LoadDone,
    LoadNoData,
    DeleteListChoice,
    DeleteConfirm,
    Deleting,
    DeleteDone,
    DeleteNoData,
}

/// Which answer the yes/no prompt has highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

pub struct SaveDialog {
    manager: SavedataManager,
    status: DialogStatus,
    display: DisplayState,
    current_selected_save: usize,
    yes_no: YesNo,
    buttons: u32,
    last_buttons: u32,
    ok_button_flag: u32,
    cancel_button_flag: u32,
    ok_button_img: AtlasImage,
    cancel_button_img: AtlasImage,
}

impl SaveDialog {
    pub fn new(manager: SavedataManager) -> Self {
        SaveDialog {
            manager,
            status: DialogStatus::None,
            display: DisplayState::Idle,
            current_selected_save: 0,
            yes_no: YesNo::No,
            buttons: 0,
            last_buttons: 0,
            ok_button_flag: CTRL_CIRCLE,
            cancel_button_flag: CTRL_CROSS,
            ok_button_img: AtlasImage::Circle,
            cancel_button_img: AtlasImage::Cross,
        }
    }

    pub fn manager(&self) -> &SavedataManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SavedataManager {
        &mut self.manager
    }

    pub fn display(&self) -> DisplayState {
        self.display
    }

    /// Highlighted position in the slot list.
    pub fn current_selected_save(&self) -> usize {
        self.current_selected_save
    }

    /// Start a session for the parameter block at `param_addr`.
    ///
    /// ## Arguments:
    ///   - `vfs`: mount table the slots are scanned on.
    ///   - `mem`: guest memory holding the block and its name list.
    ///   - `input`: sampled once so a button already held does not fire.
    ///   - `param_addr`: guest address of the `SceUtilitySavedataParam`.
    ///
    /// ## Returns:
    ///   - 0; problems with the request are reported through its result word.
    pub fn init(
        &mut self,
        vfs: &MetaFileSystem,
        mem: &mut dyn GuestMemory,
        input: &dyn ButtonSource,
        param_addr: u32,
    ) -> u32 {
        self.manager.set_param(vfs, &*mem, Some(param_addr));
        let Some(request) = self.manager.request() else {
            error!("sceUtilitySavedataInitStart({:08x}): unreadable parameter block", param_addr);
            self.status = DialogStatus::Finished;
            return 0;
        };
        let param = request.param();
        debug!("sceUtilitySavedataInitStart({:08x})", param_addr);
        debug!(
            "Mode: {} Title: {} Save: {} File: {}",
            param.mode,
            param.game_name(),
            param.save_name(),
            param.file_name()
        );

        let empty = self.manager.file_count() == 0;
        self.display = match request.mode() {
            Some(SavedataMode::ListLoad) if empty => DisplayState::LoadNoData,
            Some(SavedataMode::ListLoad) => DisplayState::LoadListChoice,
            Some(SavedataMode::ListSave) => DisplayState::SaveListChoice,
            Some(SavedataMode::ListDelete) if empty => DisplayState::DeleteNoData,
            Some(SavedataMode::ListDelete) => DisplayState::DeleteListChoice,
            Some(_) => DisplayState::Idle,
            None => {
                error!(
                    "Load/Save function {} not coded. Title: {} Save: {} File: {}",
                    param.mode,
                    param.game_name(),
                    param.save_name(),
                    param.file_name()
                );
                request.write_result(mem, 0);
                self.status = DialogStatus::Finished;
                return 0;
            }
        };

        self.status = DialogStatus::Initialize;
        self.current_selected_save = 0;
        self.yes_no = YesNo::No;
        self.last_buttons = input.peek_buttons();
        0
    }

    /// Report the status; `Initialize` becomes `Running` and `Shutdown`
    /// becomes `None` once they have been seen.
    pub fn get_status(&mut self) -> DialogStatus {
        let status = self.status;
        match status {
            DialogStatus::Initialize => self.status = DialogStatus::Running,
            DialogStatus::Shutdown => self.status = DialogStatus::None,
            _ => {}
        }
        status
    }

    pub fn shutdown(&mut self) {
        self.status = DialogStatus::Shutdown;
        self.display = DisplayState::Idle;
        self.manager.clear_param();
    }

    /// Run one frame.
    pub fn update(
        &mut self,
        vfs: &mut MetaFileSystem,
        mem: &mut dyn GuestMemory,
        input: &dyn ButtonSource,
        draw: &mut dyn PpgeDraw,
    ) {
        if self.status == DialogStatus::Finished {
            self.status = DialogStatus::Shutdown;
        }
        if self.status != DialogStatus::Running {
            return;
        }
        let Some(request) = self.manager.request() else {
            self.status = DialogStatus::Shutdown;
            return;
        };
        let swapped = request.param().button_swap == 1;

        self.buttons = input.peek_buttons();
        if swapped {
            self.ok_button_img = AtlasImage::Cross;
            self.cancel_button_img = AtlasImage::Circle;
            self.ok_button_flag = CTRL_CROSS;
            self.cancel_button_flag = CTRL_CIRCLE;
        } else {
            self.ok_button_img = AtlasImage::Circle;
            self.cancel_button_img = AtlasImage::Cross;
            self.ok_button_flag = CTRL_CIRCLE;
            self.cancel_button_flag = CTRL_CROSS;
        }

        match self.display {
            DisplayState::Idle => {
                self.run_direct(vfs, mem);
                return;
            }
            DisplayState::SaveListChoice => {
                draw.begin();
                self.display_title(draw, "Save");
                self.display_save_list(draw);
                self.display_save_data_info1(draw);
                self.display_enter_back(draw);
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish(mem, SCE_UTILITY_DIALOG_RESULT_CANCEL);
                } else if self.is_button_pressed(self.ok_button_flag) {
                    if self.selected_size() > 0 {
                        self.yes_no = YesNo::No;
                        self.display = DisplayState::ConfirmOverwrite;
                    } else {
                        self.do_save(vfs, mem);
                    }
                }
                draw.end();
            }
            DisplayState::ConfirmOverwrite => {
                draw.begin();
                self.display_title(draw, "Save");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_confirmation_yes_no(draw, "Do you want to overwrite the data ?");
                self.display_enter_back(draw);
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.display = DisplayState::SaveListChoice;
                } else if self.is_button_pressed(self.ok_button_flag) {
                    match self.yes_no {
                        YesNo::No => self.display = DisplayState::SaveListChoice,
                        YesNo::Yes => self.do_save(vfs, mem),
                    }
                }
                draw.end();
            }
            DisplayState::Saving => {
                draw.begin();
                self.display_title(draw, "Save");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_info(draw, "Saving\nPlease Wait...");
                draw.end();
            }
            DisplayState::SaveDone => {
                draw.begin();
                self.display_title(draw, "Save");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_back(draw);
                self.display_info(draw, "Save completed");
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish_with_selected(mem);
                }
                draw.end();
            }
            DisplayState::LoadListChoice => {
                draw.begin();
                self.display_title(draw, "Load");
                self.display_save_list(draw);
                self.display_save_data_info1(draw);
                self.display_enter_back(draw);
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish(mem, SCE_UTILITY_DIALOG_RESULT_CANCEL);
                } else if self.is_button_pressed(self.ok_button_flag) {
                    self.display = DisplayState::Loading;
                    self.display = if self.manager.load(vfs, mem, self.current_selected_save) {
                        DisplayState::LoadDone
                    } else {
                        DisplayState::LoadListChoice
                    };
                }
                draw.end();
            }
            DisplayState::Loading => {
                draw.begin();
                self.display_title(draw, "Load");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_info(draw, "Loading\nPlease Wait...");
                draw.end();
            }
            DisplayState::LoadDone => {
                draw.begin();
                self.display_title(draw, "Load");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_back(draw);
                self.display_info(draw, "Load completed");
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish_with_selected(mem);
                }
                draw.end();
            }
            DisplayState::LoadNoData => {
                draw.begin();
                self.display_title(draw, "Load");
                self.display_back(draw);
                self.display_info(draw, "There is no data");
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish(mem, SceError::SavedataLoadNoData.code());
                }
                draw.end();
            }
            DisplayState::DeleteListChoice => {
                draw.begin();
                self.display_title(draw, "Delete");
                self.display_save_list(draw);
                self.display_save_data_info1(draw);
                self.display_enter_back(draw);
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish(mem, SCE_UTILITY_DIALOG_RESULT_CANCEL);
                } else if self.is_button_pressed(self.ok_button_flag) {
                    self.yes_no = YesNo::No;
                    self.display = DisplayState::DeleteConfirm;
                }
                draw.end();
            }
            DisplayState::DeleteConfirm => {
                draw.begin();
                self.display_title(draw, "Delete");
                self.display_save_icon(draw);
                self.display_save_data_info2(draw);
                self.display_confirmation_yes_no(
                    draw,
                    "The data will be deleted.\nAre you sure you want to continue?",
                );
                self.display_enter_back(draw);
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.display = DisplayState::DeleteListChoice;
                } else if self.is_button_pressed(self.ok_button_flag) {
                    match self.yes_no {
                        YesNo::No => self.display = DisplayState::DeleteListChoice,
                        YesNo::Yes => self.do_delete(vfs, mem),
                    }
                }
                draw.end();
            }
            DisplayState::Deleting => {
                draw.begin();
                self.display_title(draw, "Delete");
                self.display_info(draw, "Deleting\nPlease Wait...");
                draw.end();
            }
            DisplayState::DeleteDone => {
                draw.begin();
                self.display_title(draw, "Delete");
                self.display_back(draw);
                self.display_info(draw, "Delete completed");
                if self.is_button_pressed(self.cancel_button_flag) {
                    if self.manager.file_count() == 0 {
                        self.display = DisplayState::DeleteNoData;
                    } else {
                        self.current_selected_save =
                            self.current_selected_save.min(self.manager.file_count() - 1);
                        self.display = DisplayState::DeleteListChoice;
                    }
                }
                draw.end();
            }
            DisplayState::DeleteNoData => {
                draw.begin();
                self.display_title(draw, "Delete");
                self.display_back(draw);
                self.display_info(draw, "There is no data");
                if self.is_button_pressed(self.cancel_button_flag) {
                    self.finish(mem, SceError::SavedataDeleteNoData.code());
                }
                draw.end();
            }
        }

        self.last_buttons = self.buttons;
    }

    /// Requests that show nothing.
    fn run_direct(&mut self, vfs: &mut MetaFileSystem, mem: &mut dyn GuestMemory) {
        let Some(mode) = self.manager.request().and_then(|r| r.mode()) else {
            self.status = DialogStatus::Finished;
            return;
        };
        let slot = self.manager.selected_save();
        let result = match mode {
            SavedataMode::Load | SavedataMode::AutoLoad => {
                if self.manager.load(vfs, mem, slot) {
                    0
                } else {
                    SceError::SavedataLoadNoData.code()
                }
            }
            SavedataMode::Save | SavedataMode::AutoSave => {
                if self.manager.save(vfs, &*mem, slot) {
                    0
                } else {
                    SceError::SavedataSaveMsNoSpace.code()
                }
            }
            SavedataMode::Delete => {
                if self.manager.delete(vfs, slot) {
                    0
                } else {
                    SceError::SavedataDeleteNoData.code()
                }
            }
            SavedataMode::Sizes => {
                self.manager.get_sizes(mem);
                SceError::SavedataSizesNoData.code()
            }
            SavedataMode::List => {
                self.manager.get_list(mem);
                0
            }
            SavedataMode::ListLoad | SavedataMode::ListSave | SavedataMode::ListDelete => {
                self.status = DialogStatus::Finished;
                return;
            }
        };
        self.finish(mem, result);
    }

    fn do_save(&mut self, vfs: &mut MetaFileSystem, mem: &mut dyn GuestMemory) {
        self.display = DisplayState::Saving;
        if self.manager.save(vfs, &*mem, self.current_selected_save) {
            self.rescan(vfs, mem);
            self.display = DisplayState::SaveDone;
        } else {
            self.display = DisplayState::SaveListChoice;
        }
    }

    fn do_delete(&mut self, vfs: &mut MetaFileSystem, mem: &mut dyn GuestMemory) {
        self.display = DisplayState::Deleting;
        if self.manager.delete(vfs, self.current_selected_save) {
            self.rescan(vfs, mem);
            self.display = DisplayState::DeleteDone;
        } else {
            self.display = DisplayState::DeleteListChoice;
        }
    }

    /// Re-register the current request so slot sizes reflect the last write.
    fn rescan(&mut self, vfs: &MetaFileSystem, mem: &dyn GuestMemory) {
        let addr = self.manager.request().map(|r| r.addr());
        self.manager.set_param(vfs, mem, addr);
    }

    fn finish(&mut self, mem: &mut dyn GuestMemory, result: u32) {
        self.status = DialogStatus::Finished;
        if let Some(request) = self.manager.request() {
            request.write_result(mem, result);
        }
    }

    /// Successful save or load: the slot becomes the default for automatic
    /// saves and loads.
    fn finish_with_selected(&mut self, mem: &mut dyn GuestMemory) {
        self.finish(mem, SCE_UTILITY_DIALOG_RESULT_SUCCESS);
        if let Some(idx) = self.manager.file_info(self.current_selected_save).map(|s| s.idx) {
            self.manager.set_selected_save(idx);
        }
    }

    fn is_button_pressed(&self, flag: u32) -> bool {
        self.last_buttons & flag == 0 && self.buttons & flag != 0
    }

    fn selected_size(&self) -> u64 {
        self.manager
            .file_info(self.current_selected_save)
            .map_or(0, |s| s.size)
    }

    fn display_save_list(&mut self, draw: &mut dyn PpgeDraw) {
        let current = self.current_selected_save;
        for (i, slot) in self.manager.save_list().iter().enumerate() {
            let color = if slot.size == 0 { COLOR_SLOT_EMPTY } else { COLOR_SLOT_USED };
            let (w, h, x) = if i == current { (150.0, 80.0, 20.0) } else { (80.0, 40.0, 50.0) };
            let y = if i < current {
                80.0 - 50.0 * (current - i) as f32
            } else if i > current {
                80.0 + 90.0 + 50.0 * (i - current - 1) as f32
            } else {
                80.0
            };
            draw.draw_4patch(AtlasImage::Button, x, y, w, h, color);
        }

        if self.is_button_pressed(CTRL_UP) && current > 0 {
            self.current_selected_save -= 1;
        } else if self.is_button_pressed(CTRL_DOWN) && current + 1 < self.manager.file_count() {
            self.current_selected_save += 1;
        }
    }

    fn display_save_icon(&self, draw: &mut dyn PpgeDraw) {
        let color = if self.selected_size() == 0 { COLOR_SLOT_EMPTY } else { COLOR_SLOT_USED };
        draw.draw_4patch(AtlasImage::Button, 20.0, 80.0, 150.0, 80.0, color);
    }

    fn selected_summary(&self) -> Option<String> {
        self.manager
            .file_info(self.current_selected_save)
            .filter(|s| s.size > 0)
            .map(|s| format!("{}\nSize : {}", s.name, s.size))
    }

    fn display_save_data_info1(&self, draw: &mut dyn PpgeDraw) {
        match self.selected_summary() {
            Some(txt) => draw.draw_text(&txt, 200.0, 100.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE),
            None => draw.draw_text("New Save", 200.0, 110.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE),
        }
    }

    fn display_save_data_info2(&self, draw: &mut dyn PpgeDraw) {
        if let Some(txt) = self.selected_summary() {
            draw.draw_text(&txt, 10.0, 180.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
        }
    }

    fn display_confirmation_yes_no(&mut self, draw: &mut dyn PpgeDraw, text: &str) {
        let color = |on: bool| if on { COLOR_HIGHLIGHT } else { COLOR_WHITE };
        draw.draw_text(text, 200.0, 90.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
        draw.draw_text("Yes", 250.0, 150.0, PPGE_ALIGN_LEFT, TEXT_SCALE, color(self.yes_no == YesNo::Yes));
        draw.draw_text("No", 350.0, 150.0, PPGE_ALIGN_LEFT, TEXT_SCALE, color(self.yes_no == YesNo::No));

        if self.is_button_pressed(CTRL_LEFT) && self.yes_no == YesNo::No {
            self.yes_no = YesNo::Yes;
        } else if self.is_button_pressed(CTRL_RIGHT) && self.yes_no == YesNo::Yes {
            self.yes_no = YesNo::No;
        }
    }

    fn display_info(&self, draw: &mut dyn PpgeDraw, text: &str) {
        draw.draw_text(text, 200.0, 90.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
    }

    fn display_title(&self, draw: &mut dyn PpgeDraw, name: &str) {
        draw.draw_text(name, 10.0, 10.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
    }

    fn display_enter_back(&self, draw: &mut dyn PpgeDraw) {
        draw.draw_image(self.ok_button_img, 200.0, 220.0, 20.0, 20.0, 0, COLOR_WHITE);
        draw.draw_text("Enter", 230.0, 220.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
        draw.draw_image(self.cancel_button_img, 290.0, 220.0, 20.0, 20.0, 0, COLOR_WHITE);
        draw.draw_text("Back", 320.0, 220.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
    }

    fn display_back(&self, draw: &mut dyn PpgeDraw) {
        draw.draw_image(self.cancel_button_img, 250.0, 220.0, 20.0, 20.0, 0, COLOR_WHITE);
        draw.draw_text("Back", 270.0, 220.0, PPGE_ALIGN_LEFT, TEXT_SCALE, COLOR_WHITE);
    }
}
