//! Fixed names and limits shared by the compiler stages.

/// WiX v3 document namespace.
pub const WIX_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/wi";

/// WiX util extension namespace (`CloseApplication` and friends).
pub const WIX_UTIL_NAMESPACE: &str = "http://schemas.microsoft.com/wix/UtilExtension";

/// Id of the implicit root directory wrapping every declared directory.
pub const TARGET_DIR_ID: &str = "TARGETDIR";

/// Default id given to the logical installation directory.
pub const INSTALL_DIR_ID: &str = "INSTALLDIR";

/// Name of the feature that collects components with no explicit feature.
pub const DEFAULT_FEATURE_NAME: &str = "Complete";

/// Length of the truncated hash used for manifest fingerprints.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Generated identifiers longer than this are truncated from the left.
pub const MAX_ID_LENGTH: usize = 30;

/// Condition emitted when an action has no condition of its own.
pub const ALWAYS_TRUE_CONDITION: &str = "1";

/// Order stamped on every unordered action of a strict dialog sequence.
pub const STRICT_ORDER: u32 = 5;

/// Order used by the built-in flows for the exit dialog's finish button.
pub const FINISH_ORDER: u32 = 9999;

/// Special folder placeholders and the directory ids they stand for.
///
/// The long forms come first so that `%ProgramFiles64%` is replaced before
/// `%ProgramFiles%` gets a chance to match its prefix.
pub const SPECIAL_FOLDERS: &[(&str, &str)] = &[
  ("%AdminToolsFolder%", "AdminToolsFolder"),
  ("%AppDataFolder%", "AppDataFolder"),
  ("%CommonAppDataFolder%", "CommonAppDataFolder"),
  ("%CommonFiles64Folder%", "CommonFiles64Folder"),
  ("%CommonFilesFolder%", "CommonFilesFolder"),
  ("%DesktopFolder%", "DesktopFolder"),
  ("%FavoritesFolder%", "FavoritesFolder"),
  ("%FontsFolder%", "FontsFolder"),
  ("%LocalAppDataFolder%", "LocalAppDataFolder"),
  ("%MyPicturesFolder%", "MyPicturesFolder"),
  ("%PersonalFolder%", "PersonalFolder"),
  ("%ProgramFiles64Folder%", "ProgramFiles64Folder"),
  ("%ProgramFilesFolder%", "ProgramFilesFolder"),
  ("%ProgramMenuFolder%", "ProgramMenuFolder"),
  ("%SendToFolder%", "SendToFolder"),
  ("%StartMenuFolder%", "StartMenuFolder"),
  ("%StartupFolder%", "StartupFolder"),
  ("%System16Folder%", "System16Folder"),
  ("%System64Folder%", "System64Folder"),
  ("%SystemFolder%", "SystemFolder"),
  ("%TempFolder%", "TempFolder"),
  ("%TemplateFolder%", "TemplateFolder"),
  ("%WindowsFolder%", "WindowsFolder"),
  ("%WindowsVolume%", "WindowsVolume"),
  ("%AdminTools%", "AdminToolsFolder"),
  ("%AppData%", "AppDataFolder"),
  ("%CommonAppData%", "CommonAppDataFolder"),
  ("%CommonFiles64%", "CommonFiles64Folder"),
  ("%CommonFiles%", "CommonFilesFolder"),
  ("%Desktop%", "DesktopFolder"),
  ("%Favorites%", "FavoritesFolder"),
  ("%Fonts%", "FontsFolder"),
  ("%LocalAppData%", "LocalAppDataFolder"),
  ("%MyPictures%", "MyPicturesFolder"),
  ("%Personal%", "PersonalFolder"),
  ("%ProgramFiles64%", "ProgramFiles64Folder"),
  ("%ProgramFiles%", "ProgramFilesFolder"),
  ("%ProgramMenu%", "ProgramMenuFolder"),
  ("%SendTo%", "SendToFolder"),
  ("%StartMenu%", "StartMenuFolder"),
  ("%Startup%", "StartupFolder"),
  ("%System16%", "System16Folder"),
  ("%System64%", "System64Folder"),
  ("%System%", "SystemFolder"),
  ("%Temp%", "TempFolder"),
  ("%Template%", "TemplateFolder"),
  ("%Windows%", "WindowsFolder"),
];

/// Dialogs shipped with the stock UI that custom flows reference by name.
pub const COMMON_DIALOGS: &[&str] = &[
  "BrowseDlg",
  "DiskCostDlg",
  "ErrorDlg",
  "FatalError",
  "FilesInUse",
  "MsiRMFilesInUse",
  "PrepareDlg",
  "ProgressDlg",
  "ResumeDlg",
  "UserExit",
];
