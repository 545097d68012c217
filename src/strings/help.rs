//! # Help Text
//!
//! Detailed help message for the slash commands.
//! Displayed to the user via the `/help` command.

pub const MAIN: &str = concat!(
    "\x1b[36m━━━ AVAILABLE COMMANDS ━━━\x1b[0m\n",
    "\n",
    "\x1b[33mNavigation:\x1b[0m\n",
    "  \x1b[32m/pwd\x1b[0m              Show current directory\n",
    "  \x1b[32m/ls\x1b[0m               List files and folders\n",
    "  \x1b[32m/cd <dir>\x1b[0m         Change directory\n",
    "  \x1b[32m/tree\x1b[0m             Show directory tree\n",
    "\n",
    "\x1b[33mFile Operations:\x1b[0m\n",
    "  \x1b[32m/cat <file>\x1b[0m       View file contents\n",
    "  \x1b[32m/touch <file>\x1b[0m     Create empty file\n",
    "  \x1b[32m/cp <src> <dst>\x1b[0m   Copy file\n",
    "  \x1b[32m/mv <src> <dst>\x1b[0m   Move/rename file\n",
    "  \x1b[32m/rm <file>\x1b[0m        Move file to trash\n",
    "\n",
    "\x1b[33mDirectory Operations:\x1b[0m\n",
    "  \x1b[32m/mkdir <name>\x1b[0m     Create directory\n",
    "  \x1b[32m/rmdir <dir>\x1b[0m      Move directory to trash\n",
    "\n",
    "\x1b[33mUtility:\x1b[0m\n",
    "  \x1b[32m/find <pattern>\x1b[0m   Search for files\n",
    "  \x1b[32m/echo <text>\x1b[0m      Print text\n",
    "  \x1b[32m/clear\x1b[0m            Clear screen\n",
    "  \x1b[32m/mode <chat|agent>\x1b[0m Switch conversation mode\n",
    "  \x1b[32m/cancel\x1b[0m           Stop the model runtime\n",
    "  \x1b[32m/help\x1b[0m             Show this help\n"
);
